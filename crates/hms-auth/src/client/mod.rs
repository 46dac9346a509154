//! Client-side credential resolution.
//!
//! Outbound API calls made on behalf of a signed-in user need a bearer
//! token. Where that token comes from depends on how the user reached the
//! application: a token stored from an earlier call, a token handed over in
//! the page URL, the gateway's session, or the identity provider's session.
//!
//! The page state is passed explicitly as a [`CredentialContext`] instead of
//! being read from ambient globals.

pub mod context;
pub mod fetch;
pub mod resolver;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityProviderError;

pub use context::CredentialContext;
pub use fetch::{ApiRequest, AuthenticatedClient};
pub use resolver::{
    CredentialResolver, CredentialSource, GatewaySessionSource, HttpGatewaySession,
    ResolvedCredential, SessionTokenSource,
};

/// Client credential resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Ports served by the gateway. A page on one of these is behind it.
    pub gateway_ports: Vec<u16>,

    /// Host names served by the gateway.
    pub gateway_hosts: Vec<String>,

    /// Path of the gateway's "who am I" endpoint, relative to the page origin.
    pub whoami_path: String,

    /// Query parameters that may carry a handed-over token, in priority order.
    pub url_token_params: Vec<String>,

    /// Keep a token taken from the URL as the stored token for later calls.
    pub persist_url_token: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_ports: Vec::new(),
            gateway_hosts: Vec::new(),
            whoami_path: "/gateway/session".to_string(),
            url_token_params: vec!["access_token".to_string(), "token".to_string()],
            persist_url_token: true,
        }
    }
}

/// Errors from client-side credential resolution and authenticated calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No credential source produced a token.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The identity provider could not be asked for a session.
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// The gateway session endpoint failed.
    #[error("Gateway session error: {0}")]
    Gateway(String),

    /// The API request could not be sent.
    #[error("Request failed: {0}")]
    Transport(String),

    /// A URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<IdentityProviderError> for ClientError {
    fn from(error: IdentityProviderError) -> Self {
        Self::IdentityProvider(error.to_string())
    }
}
