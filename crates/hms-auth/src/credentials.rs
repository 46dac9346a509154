//! Credential extraction from inbound requests.
//!
//! Inspects one request and picks at most one primary credential by strict
//! precedence:
//!
//! 1. `Authorization: Bearer <token>`
//! 2. Gateway-forwarded user headers, only when the request came through a
//!    trusted gateway hop
//! 3. The identity provider's session cookie
//!
//! A bearer token always wins over gateway headers: a direct caller
//! presenting its own token is never re-interpreted as a gateway identity.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, header::AUTHORIZATION, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::config::{AuthConfig, ConfigError};
use crate::gateway::{GatewayTrust, gateway_trust_from_config};

// =============================================================================
// Inbound Request View
// =============================================================================

/// The parts of an inbound request that credential extraction looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    headers: &'a HeaderMap,
    peer_addr: Option<SocketAddr>,
}

impl<'a> InboundRequest<'a> {
    /// Creates a view over request headers with no known peer address.
    #[must_use]
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            peer_addr: None,
        }
    }

    /// Sets the address of the network peer that sent the request.
    #[must_use]
    pub fn with_peer_addr(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }

    /// Creates a view from axum request parts.
    ///
    /// The peer address is taken from `ConnectInfo<SocketAddr>` when the
    /// server was started with connect info.
    #[must_use]
    pub fn from_parts(parts: &'a Parts) -> Self {
        let peer_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Self {
            headers: &parts.headers,
            peer_addr,
        }
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    /// Address of the network peer, if known.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Returns a header value as trimmed UTF-8, ignoring empty values.
    #[must_use]
    pub fn header_str(&self, name: &HeaderName) -> Option<&'a str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

// =============================================================================
// Credential Candidates
// =============================================================================

/// Which kind of credential produced an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Bearer token from the `Authorization` header.
    BearerToken,
    /// Identity forwarded by the trusted gateway.
    GatewayAsserted,
    /// Identity provider session cookie.
    CookieSession,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BearerToken => write!(f, "bearer_token"),
            Self::GatewayAsserted => write!(f, "gateway_asserted"),
            Self::CookieSession => write!(f, "cookie_session"),
        }
    }
}

/// The primary credential found on a request.
///
/// `Debug` never prints token or cookie contents.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialCandidate {
    /// Raw bearer token.
    BearerToken(String),
    /// Identity asserted by the trusted gateway.
    GatewayAsserted {
        /// Forwarded user id.
        user_id: String,
        /// Forwarded email, format unverified.
        email: String,
    },
    /// Raw session cookie value.
    CookieSession(String),
    /// No credential of any kind.
    NoCredential,
}

impl CredentialCandidate {
    /// Returns the credential kind, or `None` for [`CredentialCandidate::NoCredential`].
    #[must_use]
    pub fn kind(&self) -> Option<CredentialKind> {
        match self {
            Self::BearerToken(_) => Some(CredentialKind::BearerToken),
            Self::GatewayAsserted { .. } => Some(CredentialKind::GatewayAsserted),
            Self::CookieSession(_) => Some(CredentialKind::CookieSession),
            Self::NoCredential => None,
        }
    }
}

impl fmt::Debug for CredentialCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BearerToken(_) => f.write_str("BearerToken(..)"),
            Self::GatewayAsserted { .. } => f.write_str("GatewayAsserted { .. }"),
            Self::CookieSession(_) => f.write_str("CookieSession(..)"),
            Self::NoCredential => f.write_str("NoCredential"),
        }
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Picks the primary credential of a request.
#[derive(Clone)]
pub struct CredentialExtractor {
    trust: Arc<dyn GatewayTrust>,
    user_id_header: HeaderName,
    email_header: HeaderName,
    cookie_name: String,
}

impl fmt::Debug for CredentialExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialExtractor")
            .field("user_id_header", &self.user_id_header)
            .field("email_header", &self.email_header)
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl CredentialExtractor {
    /// Creates an extractor with an explicit trust predicate.
    #[must_use]
    pub fn new(
        trust: Arc<dyn GatewayTrust>,
        user_id_header: HeaderName,
        email_header: HeaderName,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            trust,
            user_id_header,
            email_header,
            cookie_name: cookie_name.into(),
        }
    }

    /// Creates an extractor from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header name is invalid.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let trust = gateway_trust_from_config(&config.gateway)?;
        Ok(Self::new(
            trust,
            parse_header_name("gateway.user_id_header", &config.gateway.user_id_header)?,
            parse_header_name("gateway.email_header", &config.gateway.email_header)?,
            config.session.cookie_name.clone(),
        ))
    }

    /// Extracts the primary credential of a request.
    ///
    /// Precedence is bearer token, then gateway identity headers from a
    /// trusted hop, then the session cookie. Gateway headers are only used
    /// when both the user-id and the email header are present and non-empty;
    /// an identity without an email falls through to the cookie.
    #[must_use]
    pub fn extract(&self, request: &InboundRequest<'_>) -> CredentialCandidate {
        if let Some(token) = bearer_token(request) {
            return CredentialCandidate::BearerToken(token.to_string());
        }

        if let Some(candidate) = self.gateway_identity(request) {
            return candidate;
        }

        if let Some(session) = self.session_cookie(request) {
            return CredentialCandidate::CookieSession(session);
        }

        CredentialCandidate::NoCredential
    }

    fn gateway_identity(&self, request: &InboundRequest<'_>) -> Option<CredentialCandidate> {
        let user_id = request.header_str(&self.user_id_header);
        let email = request.header_str(&self.email_header);

        if user_id.is_none() && email.is_none() {
            return None;
        }

        if !self.trust.is_trusted_hop(request) {
            tracing::debug!(
                peer = ?request.peer_addr(),
                "Ignoring gateway identity headers from untrusted hop"
            );
            return None;
        }

        match (user_id, email) {
            (Some(user_id), Some(email)) => Some(CredentialCandidate::GatewayAsserted {
                user_id: user_id.to_string(),
                email: email.to_string(),
            }),
            _ => {
                tracing::debug!("Incomplete gateway identity headers");
                None
            }
        }
    }

    fn session_cookie(&self, request: &InboundRequest<'_>) -> Option<String> {
        let jar = CookieJar::from_headers(request.headers());
        jar.get(&self.cookie_name)
            .map(|cookie| cookie.value().trim())
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }
}

/// Extracts a non-empty bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively. Other schemes are ignored.
#[must_use]
pub fn bearer_token<'a>(request: &InboundRequest<'a>) -> Option<&'a str> {
    let value = request.header_str(&AUTHORIZATION)?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub(crate) fn parse_header_name(field: &str, value: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|_| {
        ConfigError::InvalidValue(format!("{field}: '{value}' is not a valid header name"))
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MarkerHeaderTrust, NeverTrust};
    use axum::http::HeaderValue;

    fn extractor(trust: Arc<dyn GatewayTrust>) -> CredentialExtractor {
        CredentialExtractor::new(
            trust,
            HeaderName::from_static("x-hms-user-id"),
            HeaderName::from_static("x-hms-user-email"),
            "hms-auth-token",
        )
    }

    fn marker_trust() -> Arc<dyn GatewayTrust> {
        Arc::new(MarkerHeaderTrust::new(HeaderName::from_static(
            "x-hms-gateway",
        )))
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token() {
        let h = headers(&[("authorization", "Bearer abc.def")]);
        let candidate = extractor(marker_trust()).extract(&InboundRequest::new(&h));
        assert_eq!(
            candidate,
            CredentialCandidate::BearerToken("abc.def".to_string())
        );
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        let h = headers(&[("authorization", "bearer tok")]);
        assert_eq!(bearer_token(&InboundRequest::new(&h)), Some("tok"));
    }

    #[test]
    fn test_empty_bearer_ignored() {
        let h = headers(&[("authorization", "Bearer    ")]);
        assert_eq!(bearer_token(&InboundRequest::new(&h)), None);
    }

    #[test]
    fn test_basic_scheme_ignored() {
        let h = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(
            extractor(marker_trust()).extract(&InboundRequest::new(&h)),
            CredentialCandidate::NoCredential
        );
    }

    #[test]
    fn test_bearer_wins_over_gateway_headers() {
        let h = headers(&[
            ("authorization", "Bearer direct"),
            ("x-hms-gateway", "true"),
            ("x-hms-user-id", "gw-user"),
            ("x-hms-user-email", "gw@example.org"),
        ]);
        let candidate = extractor(marker_trust()).extract(&InboundRequest::new(&h));
        assert_eq!(candidate.kind(), Some(CredentialKind::BearerToken));
    }

    #[test]
    fn test_gateway_headers_with_marker() {
        let h = headers(&[
            ("x-hms-gateway", "true"),
            ("x-hms-user-id", "gw-user"),
            ("x-hms-user-email", "gw@example.org"),
        ]);
        let candidate = extractor(marker_trust()).extract(&InboundRequest::new(&h));
        assert_eq!(
            candidate,
            CredentialCandidate::GatewayAsserted {
                user_id: "gw-user".to_string(),
                email: "gw@example.org".to_string(),
            }
        );
    }

    #[test]
    fn test_gateway_headers_without_marker_ignored() {
        let h = headers(&[
            ("x-hms-user-id", "gw-user"),
            ("x-hms-user-email", "gw@example.org"),
        ]);
        assert_eq!(
            extractor(marker_trust()).extract(&InboundRequest::new(&h)),
            CredentialCandidate::NoCredential
        );
    }

    #[test]
    fn test_gateway_headers_ignored_when_trust_disabled() {
        let h = headers(&[
            ("x-hms-gateway", "true"),
            ("x-hms-user-id", "gw-user"),
            ("x-hms-user-email", "gw@example.org"),
        ]);
        assert_eq!(
            extractor(Arc::new(NeverTrust)).extract(&InboundRequest::new(&h)),
            CredentialCandidate::NoCredential
        );
    }

    #[test]
    fn test_incomplete_gateway_headers_fall_through_to_cookie() {
        let h = headers(&[
            ("x-hms-gateway", "true"),
            ("x-hms-user-id", "gw-user"),
            ("cookie", "theme=dark; hms-auth-token=sess-123"),
        ]);
        assert_eq!(
            extractor(marker_trust()).extract(&InboundRequest::new(&h)),
            CredentialCandidate::CookieSession("sess-123".to_string())
        );
    }

    #[test]
    fn test_session_cookie() {
        let h = headers(&[("cookie", "hms-auth-token=sess-xyz")]);
        let candidate = extractor(marker_trust()).extract(&InboundRequest::new(&h));
        assert_eq!(candidate.kind(), Some(CredentialKind::CookieSession));
    }

    #[test]
    fn test_other_cookies_ignored() {
        let h = headers(&[("cookie", "theme=dark; lang=en")]);
        assert_eq!(
            extractor(marker_trust()).extract(&InboundRequest::new(&h)),
            CredentialCandidate::NoCredential
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let candidate = CredentialCandidate::BearerToken("super-secret".to_string());
        assert!(!format!("{candidate:?}").contains("super-secret"));
    }

    #[test]
    fn test_from_config_rejects_bad_header() {
        let mut config = AuthConfig::default();
        config.gateway.email_header = "bad header".to_string();
        assert!(CredentialExtractor::from_config(&config).is_err());
    }
}
