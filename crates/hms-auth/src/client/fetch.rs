//! Authenticated outbound API calls.

use reqwest::header::COOKIE;
use reqwest::{Method, StatusCode};
use url::Url;

use super::context::CredentialContext;
use super::resolver::{CredentialResolver, transport_summary};
use super::ClientError;

/// One outbound API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client that attaches the resolved credential to every call.
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    resolver: CredentialResolver,
}

impl AuthenticatedClient {
    /// Creates a client.
    #[must_use]
    pub fn new(http: reqwest::Client, resolver: CredentialResolver) -> Self {
        Self { http, resolver }
    }

    /// Sends `request` with `Authorization: Bearer <resolved token>`.
    ///
    /// A `401` for a page behind the gateway is retried exactly once with the
    /// page's cookies instead of the bearer token. Any second response,
    /// including another `401`, is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential can be resolved or the request
    /// cannot be sent.
    pub async fn send(
        &self,
        context: &mut CredentialContext,
        request: ApiRequest,
    ) -> Result<reqwest::Response, ClientError> {
        let credential = self.resolver.resolve(context).await?;

        let response = self
            .builder(&request)
            .bearer_auth(&credential.token)
            .send()
            .await
            .map_err(|e| ClientError::Transport(transport_summary(&e)))?;

        if response.status() != StatusCode::UNAUTHORIZED
            || !self.resolver.is_gateway_origin(&context.location)
        {
            return Ok(response);
        }

        tracing::debug!(
            source = ?credential.source,
            "Bearer call rejected behind gateway; retrying with cookies"
        );

        let mut retry = self.builder(&request);
        if let Some(cookies) = context.cookie_header.as_deref() {
            retry = retry.header(COOKIE, cookies);
        }

        retry
            .send()
            .await
            .map_err(|e| ClientError::Transport(transport_summary(&e)))
    }

    fn builder(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let builder = self.http.request(request.method.clone(), request.url.clone());
        match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}
