//! Identity provider interface.

use async_trait::async_trait;
use serde::Deserialize;

/// A principal confirmed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedIdentity {
    /// Provider subject identifier.
    pub id: String,

    /// Verified email address.
    ///
    /// Providers may return identities without an email (e.g. phone logins);
    /// those are rejected by the verifier.
    #[serde(default)]
    pub email: Option<String>,
}

impl VerifiedIdentity {
    /// Creates an identity with both fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
        }
    }

    /// Returns `(id, email)` if both are non-empty.
    #[must_use]
    pub fn complete(&self) -> Option<(&str, &str)> {
        let id = self.id.trim();
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        (!id.is_empty() && !email.is_empty()).then_some((id, email))
    }
}

/// Errors returned by identity provider calls.
///
/// Messages are summaries; they never contain the credential that was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityProviderError {
    /// The provider rejected the credential (invalid, expired, or malformed).
    #[error("credential rejected by identity provider")]
    Rejected,

    /// The provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Transport(String),

    /// The provider answered with an unexpected status code.
    #[error("identity provider returned status {0}")]
    UnexpectedStatus(u16),

    /// The provider's response body could not be understood.
    #[error("malformed identity provider response: {0}")]
    Malformed(String),
}

impl IdentityProviderError {
    /// Returns `true` if the credential itself was rejected, as opposed to an
    /// infrastructure failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// The identity provider calls this crate depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges a bearer token for the identity it was issued to.
    ///
    /// # Errors
    ///
    /// [`IdentityProviderError::Rejected`] for invalid or expired tokens;
    /// other variants for infrastructure failures.
    async fn introspect_token(&self, token: &str)
    -> Result<VerifiedIdentity, IdentityProviderError>;

    /// Resolves the identity behind a session cookie value.
    ///
    /// # Errors
    ///
    /// [`IdentityProviderError::Rejected`] for absent or expired sessions.
    async fn session_from_cookie(
        &self,
        cookie_value: &str,
    ) -> Result<VerifiedIdentity, IdentityProviderError>;

    /// Fetches the access token of the caller's current session.
    ///
    /// Used by the client credential resolver. `cookie_header` is the
    /// caller's `Cookie` header, if any. Returns `Ok(None)` when there is no
    /// current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be asked.
    async fn current_session_token(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, IdentityProviderError>;
}
