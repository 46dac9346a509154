//! HTTP middleware for authentication and authorization.
//!
//! This module provides Axum extractors for:
//!
//! - Requiring an authenticated caller ([`CurrentUser`])
//! - Optionally resolving the caller ([`OptionalUser`])
//! - Requiring one of a static set of roles ([`RequireRoles`], [`AdminUser`])
//!
//! and the `IntoResponse` implementation for [`AuthError`](crate::AuthError).
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use hms_auth::middleware::{AuthState, CurrentUser};
//!
//! async fn protected_handler(CurrentUser(user): CurrentUser) -> String {
//!     format!("Hello, {}!", user.id())
//! }
//!
//! let auth_state = AuthState::new(RequestAuthenticator::from_config(
//!     &config,
//!     provider,
//!     profiles,
//!     seats,
//! )?);
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

pub mod auth;
pub mod error;
pub mod roles;

pub use auth::{AuthState, CurrentUser, OptionalUser};
pub use error::error_json;
pub use roles::{Admin, AdminUser, RequireRoles, RoleRequirement};
