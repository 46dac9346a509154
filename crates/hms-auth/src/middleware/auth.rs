//! Authenticated user extractors.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use hms_auth::middleware::{AuthState, CurrentUser};
//!
//! async fn me(CurrentUser(user): CurrentUser) -> String {
//!     format!("Hello, {}!", user.email().as_str())
//! }
//!
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::authenticator::RequestAuthenticator;
use crate::credentials::InboundRequest;
use crate::error::AuthError;
use crate::types::AuthenticatedUser;

// =============================================================================
// Auth State
// =============================================================================

/// State required by the authentication extractors.
///
/// Include it in the application state and expose it via `FromRef`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     auth: AuthState,
///     // ... other state
/// }
///
/// impl FromRef<AppState> for AuthState {
///     fn from_ref(state: &AppState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthState {
    /// Shared request authenticator.
    pub authenticator: Arc<RequestAuthenticator>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(authenticator: RequestAuthenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }
}

// =============================================================================
// Current User Extractor
// =============================================================================

/// Axum extractor that requires an authenticated caller.
///
/// Rejects with [`AuthError::Authentication`] (401) when no identity can be
/// established. Bearer tokens, trusted gateway headers, and session cookies
/// are all accepted, in that order of precedence.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let request = InboundRequest::from_parts(parts);

        auth_state
            .authenticator
            .require_authenticated_user(&request)
            .await
            .map(CurrentUser)
    }
}

// =============================================================================
// Optional User Extractor
// =============================================================================

/// Axum extractor that resolves the caller if possible.
///
/// Never rejects: requests without a valid credential get `None`.
///
/// # Example
///
/// ```ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> String {
///     match user {
///         Some(u) => format!("Hello, {}!", u.id()),
///         None => "Hello, anonymous!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let request = InboundRequest::from_parts(parts);

        Ok(OptionalUser(
            auth_state.authenticator.try_authenticate(&request).await,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
