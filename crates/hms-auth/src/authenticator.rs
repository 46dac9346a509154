//! Request authenticator.
//!
//! Runs the resolution pipeline for one inbound request:
//!
//! ```text
//! Extract → Verify → ResolveSeat → Assemble
//! ```
//!
//! Stages run sequentially with no retries. [`RequestAuthenticator::require_authenticated_user`]
//! is the single throwing core; every other entry point adapts its result.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};

use crate::AuthResult;
use crate::assembler::UserAssembler;
use crate::config::{AuthConfig, ConfigError};
use crate::credentials::{CredentialExtractor, InboundRequest};
use crate::error::AuthError;
use crate::identity::{IdentityProvider, IdentityVerifier};
use crate::masking::LogMasker;
use crate::seat::SeatRoleResolver;
use crate::storage::{ProfileStorage, SeatStorage};
use crate::types::AuthenticatedUser;

/// Resolves the caller of inbound requests.
#[derive(Clone)]
pub struct RequestAuthenticator {
    extractor: CredentialExtractor,
    verifier: IdentityVerifier,
    resolver: SeatRoleResolver,
    assembler: UserAssembler,
    masker: LogMasker,
}

impl RequestAuthenticator {
    /// Creates an authenticator from its stages.
    #[must_use]
    pub fn new(
        extractor: CredentialExtractor,
        verifier: IdentityVerifier,
        resolver: SeatRoleResolver,
        assembler: UserAssembler,
        masker: LogMasker,
    ) -> Self {
        Self {
            extractor,
            verifier,
            resolver,
            assembler,
            masker,
        }
    }

    /// Creates an authenticator from configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(
        config: &AuthConfig,
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStorage>,
        seats: Arc<dyn SeatStorage>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let masker = LogMasker::new(config.masking.mode);

        Ok(Self::new(
            CredentialExtractor::from_config(config)?,
            IdentityVerifier::new(provider, masker),
            SeatRoleResolver::new(profiles, seats, masker),
            UserAssembler::new(config.gateway.default_role.clone()),
            masker,
        ))
    }

    /// Resolves the caller, failing if no identity can be established.
    ///
    /// Missing seat, entity, or roles are not failures; they degrade to an
    /// unaffiliated user without elevated privilege.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Authentication`] if the request carries no
    /// credential or the credential cannot be verified.
    pub async fn require_authenticated_user(
        &self,
        request: &InboundRequest<'_>,
    ) -> AuthResult<AuthenticatedUser> {
        let candidate = self.extractor.extract(request);

        let Some(kind) = candidate.kind() else {
            tracing::debug!("Authentication failed: no credential");
            return Err(AuthError::authentication("no credential"));
        };

        let Some(verification) = self.verifier.verify(&candidate).await else {
            tracing::debug!(credential = %kind, "Authentication failed: credential not verified");
            return Err(AuthError::authentication("credential not verified"));
        };

        let seat = self.resolver.resolve(&verification.id).await;
        let outcome = seat.outcome;

        let user = self.assembler.assemble(verification, seat).map_err(|e| {
            tracing::debug!(credential = %kind, error = %e, "Authentication failed: invalid identity");
            AuthError::authentication(e.to_string())
        })?;

        tracing::debug!(
            credential = %kind,
            user_id = %self.masker.id(user.id()),
            email = %self.masker.email(user.email().as_str()),
            entity_id = %user.entity_id().map(|e| self.masker.id(e)).unwrap_or_default(),
            roles = ?user.roles(),
            seat = %outcome,
            "Request authenticated"
        );

        Ok(user)
    }

    /// Resolves the caller and requires one of `allowed_roles`.
    ///
    /// Role comparison is case-insensitive. An empty `allowed_roles` list
    /// only requires authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Authentication`] as [`Self::require_authenticated_user`],
    /// or [`AuthError::Authorization`] if no resolved role is allowed.
    pub async fn require_user_with_role(
        &self,
        request: &InboundRequest<'_>,
        allowed_roles: &[&str],
    ) -> AuthResult<AuthenticatedUser> {
        let user = self.require_authenticated_user(request).await?;

        if allowed_roles.is_empty() || user.has_any_role(allowed_roles) {
            return Ok(user);
        }

        tracing::debug!(
            user_id = %self.masker.id(user.id()),
            roles = ?user.roles(),
            required = ?allowed_roles,
            "Authorization denied: missing role"
        );
        Err(AuthError::authorization(allowed_roles.iter().copied()))
    }

    /// Resolves the caller, returning `None` instead of failing.
    pub async fn try_authenticate(
        &self,
        request: &InboundRequest<'_>,
    ) -> Option<AuthenticatedUser> {
        self.require_authenticated_user(request).await.ok()
    }

    /// Resolves the caller, converting failures into an HTTP error response.
    ///
    /// For handlers that are not written as axum extractors.
    ///
    /// # Errors
    ///
    /// Returns a `401` response when no identity can be established.
    pub async fn authenticate_or_response(
        &self,
        request: &InboundRequest<'_>,
    ) -> Result<AuthenticatedUser, Response> {
        self.require_authenticated_user(request)
            .await
            .map_err(IntoResponse::into_response)
    }
}
