//! Authenticated user type.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::credentials::CredentialKind;

// =============================================================================
// User Email
// =============================================================================

/// Email address of an authenticated user.
///
/// Identity-provider identities carry a verified address. Gateway identities
/// only carry what the gateway forwarded; the value is present but its format
/// has not been checked by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UserEmail {
    /// Email confirmed by the identity provider.
    Verified(String),
    /// Email asserted by the trusted gateway.
    Asserted(String),
}

impl UserEmail {
    /// Returns the raw address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verified(email) | Self::Asserted(email) => email,
        }
    }

    /// Returns `true` if the identity provider verified this address.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Authenticated User
// =============================================================================

/// Errors raised when an [`AuthenticatedUser`] would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The subject identifier is empty.
    #[error("user id must not be empty")]
    EmptyId,

    /// The email address is empty.
    #[error("user email must not be empty")]
    EmptyEmail,
}

/// The resolved identity of the caller of one request.
///
/// Immutable and request-scoped; never persisted. Both `id` and `email` are
/// guaranteed non-empty. Platform id, entity, and roles are independently
/// optional and default to "unaffiliated, no elevated privilege".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    id: String,
    email: UserEmail,
    platform_id: Option<String>,
    entity_id: Option<String>,
    roles: IndexSet<String>,
    source: CredentialKind,
}

impl AuthenticatedUser {
    /// Creates an unaffiliated user with no roles.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or the email address is empty.
    pub fn new(
        id: impl Into<String>,
        email: UserEmail,
        source: CredentialKind,
    ) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if email.as_str().trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        Ok(Self {
            id,
            email,
            platform_id: None,
            entity_id: None,
            roles: IndexSet::new(),
            source,
        })
    }

    /// Sets the platform id.
    #[must_use]
    pub fn with_platform_id(mut self, platform_id: Option<String>) -> Self {
        self.platform_id = platform_id;
        self
    }

    /// Sets the organizational entity.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: Option<String>) -> Self {
        self.entity_id = entity_id;
        self
    }

    /// Replaces the role set, preserving iteration order.
    #[must_use]
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Identity-provider subject identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &UserEmail {
        &self.email
    }

    /// Platform-wide identifier, if a profile exists.
    #[must_use]
    pub fn platform_id(&self) -> Option<&str> {
        self.platform_id.as_deref()
    }

    /// Organizational entity of the active seat, if any.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Resolved roles in resolution order.
    #[must_use]
    pub fn roles(&self) -> &IndexSet<String> {
        &self.roles
    }

    /// Which credential produced this identity.
    #[must_use]
    pub fn source(&self) -> CredentialKind {
        self.source
    }

    /// Returns `true` if the user has no platform profile.
    #[must_use]
    pub fn is_unaffiliated(&self) -> bool {
        self.platform_id.is_none()
    }

    /// Returns `true` if the user has a specific role (case-insensitive).
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Returns `true` if the user has any of the specified roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            "3f1c",
            UserEmail::Verified("nurse@example.org".to_string()),
            CredentialKind::BearerToken,
        )
        .unwrap()
    }

    #[test]
    fn test_new_user_defaults() {
        let user = user();
        assert_eq!(user.id(), "3f1c");
        assert_eq!(user.email().as_str(), "nurse@example.org");
        assert!(user.email().is_verified());
        assert!(user.is_unaffiliated());
        assert!(user.entity_id().is_none());
        assert!(user.roles().is_empty());
        assert_eq!(user.source(), CredentialKind::BearerToken);
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = AuthenticatedUser::new(
            " ",
            UserEmail::Verified("a@b.c".to_string()),
            CredentialKind::CookieSession,
        )
        .unwrap_err();
        assert_eq!(err, UserValidationError::EmptyId);
    }

    #[test]
    fn test_empty_email_rejected() {
        let err = AuthenticatedUser::new(
            "u1",
            UserEmail::Asserted(String::new()),
            CredentialKind::GatewayAsserted,
        )
        .unwrap_err();
        assert_eq!(err, UserValidationError::EmptyEmail);
    }

    #[test]
    fn test_roles_keep_insertion_order_and_dedupe() {
        let user = user().with_roles(["manager", "employee", "manager"]);
        let roles: Vec<&str> = user.roles().iter().map(String::as_str).collect();
        assert_eq!(roles, vec!["manager", "employee"]);
    }

    #[test]
    fn test_has_role_is_case_insensitive() {
        let user = user().with_roles(["Admin"]);
        assert!(user.has_role("admin"));
        assert!(user.has_any_role(&["auditor", "ADMIN"]));
        assert!(!user.has_any_role(&["auditor"]));
    }

    #[test]
    fn test_asserted_email_serialization() {
        let email = UserEmail::Asserted("gw@example.org".to_string());
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["kind"], "asserted");
        assert_eq!(json["value"], "gw@example.org");
    }
}
