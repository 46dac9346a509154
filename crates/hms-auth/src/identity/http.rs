//! HTTP identity provider client.
//!
//! Talks to a GoTrue-style auth API:
//!
//! - `GET {base}/user` with `Authorization: Bearer <token>` returns the user
//!   the token was issued to (used for both bearer tokens and session cookies,
//!   whose value is the session's access token)
//! - `GET {base}/session` with the caller's cookies returns
//!   `{"access_token": ...}` for the current session

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, COOKIE};
use serde::Deserialize;
use url::Url;

use crate::config::IdentityProviderConfig;
use crate::error::AuthError;

use super::provider::{IdentityProvider, IdentityProviderError, VerifiedIdentity};

/// Header carrying the provider's public API key.
const API_KEY_HEADER: &str = "apikey";

/// Identity provider client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    access_token: Option<String>,
}

impl HttpIdentityProvider {
    /// Creates a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &IdentityProviderConfig) -> Result<Self, AuthError> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    /// Creates a provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        mut base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityProviderError::Malformed(format!("endpoint URL: {e}")))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn fetch_user(&self, access_token: &str) -> Result<VerifiedIdentity, IdentityProviderError> {
        let url = self.endpoint("user")?;
        let response = self
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => response
                .json::<VerifiedIdentity>()
                .await
                .map_err(|e| IdentityProviderError::Malformed(summary(&e))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => {
                Err(IdentityProviderError::Rejected)
            }
            other => Err(IdentityProviderError::UnexpectedStatus(other.as_u16())),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn introspect_token(
        &self,
        token: &str,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        self.fetch_user(token).await
    }

    async fn session_from_cookie(
        &self,
        cookie_value: &str,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        self.fetch_user(cookie_value).await
    }

    async fn current_session_token(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<String>, IdentityProviderError> {
        let url = self.endpoint("session")?;
        let mut request = self.get(url);
        if let Some(cookies) = cookie_header {
            request = request.header(COOKIE, cookies);
        }

        let response = request.send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => {
                let body: SessionResponse = response
                    .json()
                    .await
                    .map_err(|e| IdentityProviderError::Malformed(summary(&e)))?;
                Ok(body.access_token.filter(|t| !t.trim().is_empty()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            other => Err(IdentityProviderError::UnexpectedStatus(other.as_u16())),
        }
    }
}

fn transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::Transport(summary(&error))
}

/// Summarizes a reqwest error without its URL (which may carry query secrets).
fn summary(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_decode() {
        "decode"
    } else if error.is_body() {
        "body"
    } else {
        "request"
    };
    format!("{kind} error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> HttpIdentityProvider {
        let base = Url::parse(&format!("{}/auth/v1", server.uri())).unwrap();
        HttpIdentityProvider::new(base, Some("anon-key".into()), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_base_url_normalized() {
        let server = MockServer::start().await;
        let p = provider(&server).await;
        assert!(p.base_url().path().ends_with("/auth/v1/"));
    }

    #[tokio::test]
    async fn test_introspect_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer good-token"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-42",
                "email": "ward@example.org"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = provider(&server)
            .await
            .introspect_token("good-token")
            .await
            .unwrap();
        assert_eq!(identity, VerifiedIdentity::new("u-42", "ward@example.org"));
    }

    #[tokio::test]
    async fn test_introspect_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .introspect_token("expired")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityProviderError::Rejected);
    }

    #[tokio::test]
    async fn test_introspect_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .introspect_token("any")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityProviderError::UnexpectedStatus(503));
    }

    #[tokio::test]
    async fn test_introspect_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .introspect_token("any")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityProviderError::Malformed(_)));
        assert!(!err.to_string().contains("any"));
    }

    #[tokio::test]
    async fn test_session_cookie_uses_cookie_as_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer cookie-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-7",
                "email": "clerk@example.org"
            })))
            .mount(&server)
            .await;

        let identity = provider(&server)
            .await
            .session_from_cookie("cookie-token")
            .await
            .unwrap();
        assert_eq!(identity.id, "u-7");
    }

    #[tokio::test]
    async fn test_current_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/session"))
            .and(header("cookie", "hms-auth-token=abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "fresh" })),
            )
            .mount(&server)
            .await;

        let token = provider(&server)
            .await
            .current_session_token(Some("hms-auth-token=abc"))
            .await
            .unwrap();
        assert_eq!(token.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_current_session_token_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let token = provider(&server)
            .await
            .current_session_token(None)
            .await
            .unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let base = Url::parse("http://127.0.0.1:9/auth/v1/").unwrap();
        let p = HttpIdentityProvider::new(base, None, Duration::from_millis(500)).unwrap();
        let err = p.introspect_token("t").await.unwrap_err();
        assert!(matches!(err, IdentityProviderError::Transport(_)));
    }
}
