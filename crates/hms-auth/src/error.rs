//! Authentication and authorization error types.
//!
//! Every failure the resolution pipeline can surface is normalized into
//! [`AuthError`]. Lower-layer errors (HTTP client, database, JSON) are
//! summarized into one of the infrastructure variants before they reach a
//! caller, so raw tokens or database ids never leak through `Display`.

use std::fmt;

/// Errors that can occur while resolving or enforcing caller identity.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No verifiable identity could be established for the request.
    #[error("Authentication required: {message}")]
    Authentication {
        /// Internal description of why authentication failed.
        ///
        /// Never rendered to HTTP callers.
        message: String,
    },

    /// The identity was verified but none of its roles is allowed.
    #[error("Insufficient permissions: requires one of [{}]", required_roles.join(", "))]
    Authorization {
        /// Roles that would have satisfied the check.
        required_roles: Vec<String>,
    },

    /// The audit log entry could not be written.
    #[error("Audit write failed: {message}")]
    AuditWrite {
        /// Summary of the storage failure.
        message: String,
    },

    /// An error occurred while reading or writing auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Summary of the storage error.
        message: String,
    },

    /// The identity provider could not be reached or answered unexpectedly.
    #[error("Identity provider error: {message}")]
    IdentityProvider {
        /// Summary of the provider failure.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Authentication` error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new `Authorization` error for the given required roles.
    #[must_use]
    pub fn authorization<I, R>(required_roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self::Authorization {
            required_roles: required_roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a new `AuditWrite` error.
    #[must_use]
    pub fn audit_write(message: impl Into<String>) -> Self {
        Self::AuditWrite {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `IdentityProvider` error.
    #[must_use]
    pub fn identity_provider(message: impl Into<String>) -> Self {
        Self::IdentityProvider {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if no verifiable identity was established.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the identity lacked a required role.
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }

    /// Returns `true` if this is an audit write failure.
    #[must_use]
    pub fn is_audit_error(&self) -> bool {
        matches!(self, Self::AuditWrite { .. })
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Authorization { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::AuditWrite { .. } => ErrorCategory::Audit,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::IdentityProvider { .. } => ErrorCategory::IdentityProvider,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of auth errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Identity could not be verified.
    Authentication,
    /// Identity verified, permission denied.
    Authorization,
    /// Audit trail could not be written.
    Audit,
    /// Database or other storage failures.
    Infrastructure,
    /// Identity provider failures.
    IdentityProvider,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Audit => write!(f, "audit"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::IdentityProvider => write!(f, "identity_provider"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::authentication("no credential");
        assert_eq!(err.to_string(), "Authentication required: no credential");

        let err = AuthError::authorization(["admin", "manager"]);
        assert_eq!(
            err.to_string(),
            "Insufficient permissions: requires one of [admin, manager]"
        );

        let err = AuthError::audit_write("connection reset");
        assert_eq!(err.to_string(), "Audit write failed: connection reset");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::authentication("test");
        assert!(err.is_authentication_error());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = AuthError::authorization(["admin"]);
        assert!(err.is_authorization_error());
        assert!(err.is_client_error());

        let err = AuthError::audit_write("down");
        assert!(err.is_audit_error());
        assert!(err.is_server_error());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::authentication("x").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::authorization(["admin"]).category(),
            ErrorCategory::Authorization
        );
        assert_eq!(AuthError::audit_write("x").category(), ErrorCategory::Audit);
        assert_eq!(
            AuthError::identity_provider("x").category(),
            ErrorCategory::IdentityProvider
        );
        assert_eq!(
            AuthError::storage("x").category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Authentication.to_string(), "authentication");
        assert_eq!(ErrorCategory::Audit.to_string(), "audit");
        assert_eq!(
            ErrorCategory::IdentityProvider.to_string(),
            "identity_provider"
        );
    }
}
