//! Client credential resolver.
//!
//! Resolution order, first success wins:
//!
//! 1. the stored session token
//! 2. a token handed over in the page URL (removed from the URL once used)
//! 3. behind the gateway: one "who am I" call to the gateway session
//!    endpoint, falling back to the identity provider session
//! 4. otherwise: the identity provider session
//!
//! No source is retried and concurrent resolutions do not share state.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::Deserialize;
use url::Url;

use crate::identity::{HttpIdentityProvider, IdentityProvider};
use crate::masking::LogMasker;

use super::context::CredentialContext;
use super::{ClientConfig, ClientError};

// =============================================================================
// Sources
// =============================================================================

/// The gateway's session endpoint.
#[async_trait]
pub trait GatewaySessionSource: Send + Sync {
    /// Asks the gateway for the current user's access token.
    ///
    /// `origin` is the page origin the gateway serves. Returns `Ok(None)` if
    /// the gateway has no session for the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway could not be asked.
    async fn who_am_i(
        &self,
        origin: &Url,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, ClientError>;
}

/// The identity provider's current-session lookup.
#[async_trait]
pub trait SessionTokenSource: Send + Sync {
    /// Returns the access token of the caller's current session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be asked.
    async fn current_session_token(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, ClientError>;
}

#[async_trait]
impl SessionTokenSource for HttpIdentityProvider {
    async fn current_session_token(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        Ok(IdentityProvider::current_session_token(self, cookie_header).await?)
    }
}

#[derive(Debug, Deserialize)]
struct WhoAmIResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Gateway session endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGatewaySession {
    client: reqwest::Client,
    whoami_path: String,
}

impl HttpGatewaySession {
    /// Creates a gateway session client for `whoami_path`.
    #[must_use]
    pub fn new(client: reqwest::Client, whoami_path: impl Into<String>) -> Self {
        Self {
            client,
            whoami_path: whoami_path.into(),
        }
    }
}

#[async_trait]
impl GatewaySessionSource for HttpGatewaySession {
    async fn who_am_i(
        &self,
        origin: &Url,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let url = origin
            .join(&self.whoami_path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let mut request = self.client.get(url);
        if let Some(cookies) = cookie_header {
            request = request.header(COOKIE, cookies);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Gateway(transport_summary(&e)))?;

        match response.status() {
            StatusCode::OK => {
                let body: WhoAmIResponse = response
                    .json()
                    .await
                    .map_err(|_| ClientError::Gateway("malformed response".to_string()))?;
                Ok(body.access_token.filter(|t| !t.trim().is_empty()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            other => Err(ClientError::Gateway(format!("status {}", other.as_u16()))),
        }
    }
}

pub(crate) fn transport_summary(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Token already held by the page.
    Stored,
    /// Token captured from the page URL.
    Url,
    /// Token returned by the gateway who-am-i endpoint.
    Gateway,
    /// Token of the identity provider's current session.
    IdentityProvider,
}

/// A bearer token for an outbound call.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    /// Raw bearer token.
    pub token: String,
    /// Where the token was found.
    pub source: CredentialSource,
}

impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Resolves the bearer token for outbound calls.
#[derive(Clone)]
pub struct CredentialResolver {
    config: ClientConfig,
    gateway: Arc<dyn GatewaySessionSource>,
    sessions: Arc<dyn SessionTokenSource>,
    masker: LogMasker,
}

impl CredentialResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        gateway: Arc<dyn GatewaySessionSource>,
        sessions: Arc<dyn SessionTokenSource>,
        masker: LogMasker,
    ) -> Self {
        Self {
            config,
            gateway,
            sessions,
            masker,
        }
    }

    /// Returns `true` if `location` is served by the gateway.
    #[must_use]
    pub fn is_gateway_origin(&self, location: &Url) -> bool {
        let by_port = location
            .port_or_known_default()
            .is_some_and(|port| self.config.gateway_ports.contains(&port));
        let by_host = location.host_str().is_some_and(|host| {
            self.config
                .gateway_hosts
                .iter()
                .any(|h| h.eq_ignore_ascii_case(host))
        });
        by_port || by_host
    }

    /// Resolves a bearer token, updating `context` as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotLoggedIn`] if no source has a session, or an
    /// error if the identity provider could not be asked.
    pub async fn resolve(
        &self,
        context: &mut CredentialContext,
    ) -> Result<ResolvedCredential, ClientError> {
        if let Some(token) = context.stored_token() {
            return Ok(self.resolved(token.to_string(), CredentialSource::Stored));
        }

        if let Some(token) = context.take_url_token(&self.config.url_token_params) {
            if self.config.persist_url_token {
                context.stored_token = Some(token.clone());
            }
            return Ok(self.resolved(token, CredentialSource::Url));
        }

        let cookies = context.cookie_header.as_deref();

        if self.is_gateway_origin(&context.location) {
            let origin = origin_of(&context.location)?;
            match self.gateway.who_am_i(&origin, cookies).await {
                Ok(Some(token)) => return Ok(self.resolved(token, CredentialSource::Gateway)),
                Ok(None) => tracing::debug!("Gateway has no session; asking identity provider"),
                Err(e) => tracing::debug!(error = %e, "Gateway session lookup failed; asking identity provider"),
            }
        }

        match self.sessions.current_session_token(cookies).await? {
            Some(token) => Ok(self.resolved(token, CredentialSource::IdentityProvider)),
            None => {
                tracing::debug!("No client credential available");
                Err(ClientError::NotLoggedIn)
            }
        }
    }

    fn resolved(&self, token: String, source: CredentialSource) -> ResolvedCredential {
        tracing::debug!(
            source = ?source,
            token = %self.masker.token(&token),
            "Client credential resolved"
        );
        ResolvedCredential { token, source }
    }
}

fn origin_of(location: &Url) -> Result<Url, ClientError> {
    Url::parse(&location.origin().ascii_serialization())
        .map_err(|e| ClientError::InvalidUrl(e.to_string()))
}
