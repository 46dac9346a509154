//! Role-restricted extractors.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get, Json};
//! use hms_auth::middleware::{AdminUser, RequireRoles, RoleRequirement};
//!
//! struct FinanceStaff;
//!
//! impl RoleRequirement for FinanceStaff {
//!     const ROLES: &'static [&'static str] = &["finance", "admin"];
//! }
//!
//! async fn invoices(RequireRoles(user, ..): RequireRoles<FinanceStaff>) -> Json<String> {
//!     Json(user.id().to_string())
//! }
//!
//! async fn admin_handler(admin: AdminUser) -> Json<String> {
//!     Json(admin.user().id().to_string())
//! }
//! ```

use std::marker::PhantomData;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::credentials::InboundRequest;
use crate::error::AuthError;
use crate::types::AuthenticatedUser;

use super::auth::AuthState;

// =============================================================================
// Role Requirements
// =============================================================================

/// A static set of roles, any one of which grants access.
pub trait RoleRequirement: Send + Sync + 'static {
    /// Allowed roles, compared case-insensitively.
    const ROLES: &'static [&'static str];
}

/// Requires the `admin` role.
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl RoleRequirement for Admin {
    const ROLES: &'static [&'static str] = &["admin"];
}

// =============================================================================
// Require Roles Extractor
// =============================================================================

/// Axum extractor that requires an authenticated caller holding one of
/// `R::ROLES`.
///
/// Rejects with 401 when unauthenticated and 403 when no role matches.
#[derive(Debug, Clone)]
pub struct RequireRoles<R: RoleRequirement>(pub AuthenticatedUser, pub PhantomData<R>);

impl<R: RoleRequirement> RequireRoles<R> {
    /// Returns the authenticated user.
    #[must_use]
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }

    /// Consumes the extractor, returning the user.
    #[must_use]
    pub fn into_user(self) -> AuthenticatedUser {
        self.0
    }
}

impl<S, R> FromRequestParts<S> for RequireRoles<R>
where
    S: Send + Sync,
    R: RoleRequirement,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let request = InboundRequest::from_parts(parts);

        let user = auth_state
            .authenticator
            .require_user_with_role(&request, R::ROLES)
            .await?;

        Ok(RequireRoles(user, PhantomData))
    }
}

/// Extractor for admin-only endpoints.
pub type AdminUser = RequireRoles<Admin>;

// =============================================================================
// Tests
// =============================================================================
