//! Explicit page state for credential resolution.

use url::Url;

/// The caller-side state credential resolution reads and updates.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialContext {
    /// Token stored by an earlier resolution, if any.
    pub stored_token: Option<String>,

    /// Current page location. A handed-over token is removed from it once used.
    pub location: Url,

    /// `Cookie` header the page would send to its own origin.
    pub cookie_header: Option<String>,
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("has_stored_token", &self.stored_token.is_some())
            .field("origin", &self.location.origin().ascii_serialization())
            .field("has_cookies", &self.cookie_header.is_some())
            .finish()
    }
}

impl CredentialContext {
    /// Creates a context for a page with no stored token or cookies.
    #[must_use]
    pub fn new(location: Url) -> Self {
        Self {
            stored_token: None,
            location,
            cookie_header: None,
        }
    }

    /// Sets the stored token.
    #[must_use]
    pub fn with_stored_token(mut self, token: impl Into<String>) -> Self {
        self.stored_token = Some(token.into());
        self
    }

    /// Sets the page's cookie header.
    #[must_use]
    pub fn with_cookie_header(mut self, cookies: impl Into<String>) -> Self {
        self.cookie_header = Some(cookies.into());
        self
    }

    /// Returns the stored token if it is non-empty.
    #[must_use]
    pub fn stored_token(&self) -> Option<&str> {
        self.stored_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Removes the first non-empty token found under `params` from the
    /// location and returns it.
    ///
    /// Every listed parameter is stripped from the URL, whether or not it was
    /// used; other query parameters are kept in order.
    pub fn take_url_token(&mut self, params: &[String]) -> Option<String> {
        let pairs: Vec<(String, String)> = self
            .location
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let token = params.iter().find_map(|param| {
            pairs
                .iter()
                .find(|(k, v)| k == param && !v.trim().is_empty())
                .map(|(_, v)| v.trim().to_string())
        })?;

        let kept: Vec<&(String, String)> = pairs
            .iter()
            .filter(|(k, _)| !params.contains(k))
            .collect();

        if kept.is_empty() {
            self.location.set_query(None);
        } else {
            self.location
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Some(token)
    }
}
