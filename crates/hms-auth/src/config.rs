//! Authentication and authorization configuration.
//!
//! Configuration types for request authentication, gateway trust, the
//! identity provider, audit logging, and log masking.

use std::time::Duration;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::masking::{MaskingMode, REDACTED};

/// Root authentication and authorization configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.gateway]
/// enabled = true
/// trusted_proxies = ["10.0.0.0/8"]
///
/// [auth.identity_provider]
/// base_url = "https://idp.example.org/auth/v1"
/// request_timeout = "5s"
///
/// [auth.audit]
/// fail_on_error = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Gateway reverse-proxy trust configuration.
    pub gateway: GatewayConfig,

    /// Session cookie configuration.
    pub session: SessionConfig,

    /// Identity provider connection settings.
    pub identity_provider: IdentityProviderConfig,

    /// Audit logging configuration.
    pub audit: AuditConfig,

    /// Log masking configuration.
    pub masking: MaskingConfig,
}

/// Gateway trust configuration.
///
/// The gateway is a reverse proxy that authenticates users itself and
/// forwards the identity as request headers. Those headers are only honoured
/// when the request arrives through a trusted hop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Honour gateway identity headers at all.
    pub enabled: bool,

    /// Header whose value `true` marks a request as gateway-forwarded.
    pub marker_header: String,

    /// Header carrying the forwarded user id.
    pub user_id_header: String,

    /// Header carrying the forwarded user email.
    pub email_header: String,

    /// Networks the gateway connects from.
    /// When empty, the marker header alone decides trust.
    pub trusted_proxies: Vec<IpNetwork>,

    /// Role granted to gateway identities whose seat could not be resolved.
    pub default_role: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_header: "x-hms-gateway".to_string(),
            user_id_header: "x-hms-user-id".to_string(),
            email_header: "x-hms-user-email".to_string(),
            trusted_proxies: Vec::new(),
            default_role: "employee".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the identity provider's session cookie.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "hms-auth-token".to_string(),
        }
    }
}

/// Identity provider connection settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    /// Base URL of the identity provider's auth API.
    pub base_url: Url,

    /// Public API key sent as the `apikey` header, if the provider needs one.
    pub api_key: Option<String>,

    /// HTTP request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl std::fmt::Debug for IdentityProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProviderConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:9999/auth/v1/")
                .expect("static identity provider URL is valid"),
            api_key: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Write audit log entries at all.
    pub enabled: bool,

    /// Default failure policy when a call site does not choose one.
    /// `false` is fail-open, `true` is fail-closed.
    pub fail_on_error: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_on_error: false,
        }
    }
}

/// Log masking configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskingConfig {
    /// How aggressively sensitive values are masked in log lines.
    pub mode: MaskingMode,
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - gateway header names are empty or not valid header names
    /// - the gateway default role is empty
    /// - the session cookie name is empty
    /// - the identity provider URL is not http(s) or the timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.enabled {
            for (name, value) in [
                ("gateway.marker_header", &self.gateway.marker_header),
                ("gateway.user_id_header", &self.gateway.user_id_header),
                ("gateway.email_header", &self.gateway.email_header),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::Missing(name.to_string()));
                }
                if axum::http::HeaderName::from_bytes(value.as_bytes()).is_err() {
                    return Err(ConfigError::InvalidValue(format!(
                        "{name}: '{value}' is not a valid header name"
                    )));
                }
            }

            if self.gateway.default_role.trim().is_empty() {
                return Err(ConfigError::Missing("gateway.default_role".to_string()));
            }
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Missing("session.cookie_name".to_string()));
        }

        match self.identity_provider.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "identity_provider.base_url scheme '{other}' must be http or https"
                )));
            }
        }

        if self.identity_provider.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "identity_provider.request_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert!(config.gateway.enabled);
        assert_eq!(config.gateway.marker_header, "x-hms-gateway");
        assert_eq!(config.gateway.user_id_header, "x-hms-user-id");
        assert_eq!(config.gateway.email_header, "x-hms-user-email");
        assert_eq!(config.gateway.default_role, "employee");
        assert!(!config.audit.fail_on_error);
        assert_eq!(config.masking.mode, MaskingMode::Production);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut config = AuthConfig::default();
        config.identity_provider.api_key = Some("anon-key-4711".to_string());

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("anon-key-4711"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("localhost:9999"));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_header_name_fails_validation() {
        let mut config = AuthConfig::default();
        config.gateway.marker_header = "x hms gateway".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("gateway.marker_header"));
    }

    #[test]
    fn test_disabled_gateway_skips_header_validation() {
        let mut config = AuthConfig::default();
        config.gateway.enabled = false;
        config.gateway.user_id_header = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_default_role_fails_validation() {
        let mut config = AuthConfig::default();
        config.gateway.default_role = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut config = AuthConfig::default();
        config.identity_provider.request_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout"));
    }

    #[test]
    fn test_non_http_base_url_fails_validation() {
        let mut config = AuthConfig::default();
        config.identity_provider.base_url = Url::parse("ftp://idp.example.org/").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: AuthConfig = toml::from_str(
            r#"
            [gateway]
            trusted_proxies = ["10.0.0.0/8", "192.168.1.10/32"]
            default_role = "staff"

            [identity_provider]
            base_url = "https://idp.example.org/auth/v1/"
            request_timeout = "2s"

            [audit]
            fail_on_error = true

            [masking]
            mode = "development"
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.trusted_proxies.len(), 2);
        assert_eq!(config.gateway.default_role, "staff");
        assert_eq!(
            config.identity_provider.request_timeout,
            Duration::from_secs(2)
        );
        assert!(config.audit.fail_on_error);
        assert_eq!(config.masking.mode, MaskingMode::Development);
        assert_eq!(config.session.cookie_name, "hms-auth-token");
    }
}
