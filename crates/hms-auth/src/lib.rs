//! # hms-auth
//!
//! Request authentication and authorization resolution for the hospital
//! management system.
//!
//! This crate provides:
//! - Credential extraction with strict precedence (bearer token, trusted
//!   gateway headers, session cookie)
//! - Identity verification against the identity provider
//! - Seat and role resolution through profile and seat-assignment records
//! - Axum extractors and error responses
//! - Audit logging with a fail-open / fail-closed policy
//! - Client-side credential resolution for outbound API calls
//!
//! ## Overview
//!
//! Every inbound request runs through one pipeline:
//!
//! ```text
//! Extract → Verify → ResolveSeat → Assemble
//! ```
//!
//! producing an [`AuthenticatedUser`] or an [`AuthError`]. Missing seats and
//! roles never fail a request; they degrade to an unaffiliated user without
//! elevated privilege.
//!
//! ## Modules
//!
//! - [`config`] - Authentication and authorization configuration
//! - [`credentials`] - Credential extraction from inbound requests
//! - [`gateway`] - Gateway trust predicates
//! - [`identity`] - Identity provider interface and verification
//! - [`seat`] - Seat and role resolution
//! - [`authenticator`] - The request authentication pipeline
//! - [`middleware`] - Axum extractors and error responses
//! - [`audit`] - Audit logging
//! - [`client`] - Client credential resolution
//! - [`masking`] - Masking of sensitive values in logs
//! - [`storage`] - Storage traits for auth-related data

pub mod assembler;
pub mod audit;
pub mod authenticator;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod masking;
pub mod middleware;
pub mod seat;
pub mod storage;
pub mod types;

pub use assembler::UserAssembler;
pub use audit::{
    AuditAction, AuditLogEntry, AuditLogger, AuditOutcome, AuditRecord, RecordOptions,
};
pub use authenticator::RequestAuthenticator;
pub use client::{
    ApiRequest, AuthenticatedClient, ClientConfig, ClientError, CredentialContext,
    CredentialResolver, CredentialSource, GatewaySessionSource, HttpGatewaySession,
    ResolvedCredential, SessionTokenSource,
};
pub use config::{
    AuditConfig, AuthConfig, ConfigError, GatewayConfig, IdentityProviderConfig, MaskingConfig,
    SessionConfig,
};
pub use credentials::{CredentialCandidate, CredentialExtractor, CredentialKind, InboundRequest};
pub use error::{AuthError, ErrorCategory};
pub use gateway::{
    GatewayTrust, MarkerHeaderTrust, NetworkGatewayTrust, NeverTrust, gateway_trust_from_config,
};
pub use identity::{
    HttpIdentityProvider, IdentityProvider, IdentityProviderError, IdentityVerifier, Verification,
    VerifiedIdentity,
};
pub use masking::{LogMasker, MaskingMode};
pub use middleware::{
    Admin, AdminUser, AuthState, CurrentUser, OptionalUser, RequireRoles, RoleRequirement,
};
pub use seat::{SeatOutcome, SeatResolution, SeatRoleResolver};
pub use storage::{AuditLogStorage, ProfileStorage, SeatStorage};
pub use types::{AuthenticatedUser, SeatAssignment, UserEmail, UserValidationError};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use hms_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::{AuditAction, AuditLogger, AuditOutcome, AuditRecord, RecordOptions};
    pub use crate::authenticator::RequestAuthenticator;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::credentials::{CredentialKind, InboundRequest};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::identity::IdentityProvider;
    pub use crate::middleware::{AdminUser, AuthState, CurrentUser, OptionalUser, RequireRoles};
    pub use crate::storage::{AuditLogStorage, ProfileStorage, SeatStorage};
    pub use crate::types::{AuthenticatedUser, UserEmail};
}
