//! Credential verification.
//!
//! Maps one [`CredentialCandidate`] to a verified principal:
//!
//! - `BearerToken` is introspected by the identity provider
//! - `GatewayAsserted` is trusted as-is; the gateway already verified the user
//! - `CookieSession` is resolved by the identity provider's session lookup
//! - `NoCredential` fails immediately without any provider call
//!
//! Verification never returns an error. Provider failures are logged with a
//! summary (never the credential) and reported as `None`.

use std::sync::Arc;

use crate::credentials::{CredentialCandidate, CredentialKind};
use crate::masking::LogMasker;
use crate::types::UserEmail;

use super::provider::{IdentityProvider, IdentityProviderError, VerifiedIdentity};

/// A successfully verified principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Subject identifier, non-empty.
    pub id: String,

    /// Email address, non-empty.
    pub email: UserEmail,

    /// Credential kind that produced the identity.
    pub kind: CredentialKind,
}

/// Verifies credential candidates against the identity provider.
#[derive(Clone)]
pub struct IdentityVerifier {
    provider: Arc<dyn IdentityProvider>,
    masker: LogMasker,
}

impl IdentityVerifier {
    /// Creates a verifier.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, masker: LogMasker) -> Self {
        Self { provider, masker }
    }

    /// Verifies a credential candidate.
    ///
    /// Returns `None` on any failure.
    pub async fn verify(&self, candidate: &CredentialCandidate) -> Option<Verification> {
        match candidate {
            CredentialCandidate::BearerToken(token) => {
                let result = self.provider.introspect_token(token).await;
                self.accept(result, CredentialKind::BearerToken)
            }
            CredentialCandidate::GatewayAsserted { user_id, email } => {
                let (id, email) = (user_id.trim(), email.trim());
                if id.is_empty() || email.is_empty() {
                    return None;
                }
                Some(Verification {
                    id: id.to_string(),
                    email: UserEmail::Asserted(email.to_string()),
                    kind: CredentialKind::GatewayAsserted,
                })
            }
            CredentialCandidate::CookieSession(value) => {
                let result = self.provider.session_from_cookie(value).await;
                self.accept(result, CredentialKind::CookieSession)
            }
            CredentialCandidate::NoCredential => None,
        }
    }

    fn accept(
        &self,
        result: Result<VerifiedIdentity, IdentityProviderError>,
        kind: CredentialKind,
    ) -> Option<Verification> {
        match result {
            Ok(identity) => match identity.complete() {
                Some((id, email)) => Some(Verification {
                    id: id.to_string(),
                    email: UserEmail::Verified(email.to_string()),
                    kind,
                }),
                None => {
                    tracing::debug!(
                        credential = %kind,
                        user_id = %self.masker.id(&identity.id),
                        "Identity provider returned an identity without id or email"
                    );
                    None
                }
            },
            Err(IdentityProviderError::Rejected) => {
                tracing::debug!(credential = %kind, "Credential rejected by identity provider");
                None
            }
            Err(e) => {
                tracing::warn!(credential = %kind, error = %e, "Identity provider call failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock provider that accepts one token and one cookie.
    #[derive(Default)]
    struct MockProvider {
        calls: AtomicUsize,
        fail_transport: bool,
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        async fn introspect_token(
            &self,
            token: &str,
        ) -> Result<VerifiedIdentity, IdentityProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transport {
                return Err(IdentityProviderError::Transport("connection refused".into()));
            }
            match token {
                "good" => Ok(VerifiedIdentity::new("u-1", "u1@example.org")),
                "no-email" => Ok(VerifiedIdentity {
                    id: "u-2".to_string(),
                    email: None,
                }),
                _ => Err(IdentityProviderError::Rejected),
            }
        }

        async fn session_from_cookie(
            &self,
            cookie_value: &str,
        ) -> Result<VerifiedIdentity, IdentityProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if cookie_value == "sess" {
                Ok(VerifiedIdentity::new("u-3", "u3@example.org"))
            } else {
                Err(IdentityProviderError::Rejected)
            }
        }

        async fn current_session_token(
            &self,
            _cookie_header: Option<&str>,
        ) -> Result<Option<String>, IdentityProviderError> {
            Ok(None)
        }
    }

    fn verifier(provider: Arc<MockProvider>) -> IdentityVerifier {
        IdentityVerifier::new(provider, LogMasker::default())
    }

    #[tokio::test]
    async fn test_bearer_token_verified() {
        let provider = Arc::new(MockProvider::default());
        let result = verifier(provider.clone())
            .verify(&CredentialCandidate::BearerToken("good".into()))
            .await
            .unwrap();
        assert_eq!(result.id, "u-1");
        assert_eq!(result.email, UserEmail::Verified("u1@example.org".into()));
        assert_eq!(result.kind, CredentialKind::BearerToken);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bearer_token_rejected() {
        let provider = Arc::new(MockProvider::default());
        let result = verifier(provider)
            .verify(&CredentialCandidate::BearerToken("expired".into()))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_identity_without_email_rejected() {
        let provider = Arc::new(MockProvider::default());
        let result = verifier(provider)
            .verify(&CredentialCandidate::BearerToken("no-email".into()))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_none() {
        let provider = Arc::new(MockProvider {
            fail_transport: true,
            ..MockProvider::default()
        });
        let result = verifier(provider)
            .verify(&CredentialCandidate::BearerToken("good".into()))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_gateway_asserted_needs_no_provider_call() {
        let provider = Arc::new(MockProvider::default());
        let result = verifier(provider.clone())
            .verify(&CredentialCandidate::GatewayAsserted {
                user_id: "gw-1".into(),
                email: "gw@example.org".into(),
            })
            .await
            .unwrap();
        assert_eq!(result.email, UserEmail::Asserted("gw@example.org".into()));
        assert_eq!(result.kind, CredentialKind::GatewayAsserted);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cookie_session() {
        let provider = Arc::new(MockProvider::default());
        let v = verifier(provider);
        let ok = v
            .verify(&CredentialCandidate::CookieSession("sess".into()))
            .await
            .unwrap();
        assert_eq!(ok.kind, CredentialKind::CookieSession);

        let expired = v
            .verify(&CredentialCandidate::CookieSession("stale".into()))
            .await;
        assert!(expired.is_none());
    }

    #[tokio::test]
    async fn test_no_credential_makes_no_call() {
        let provider = Arc::new(MockProvider::default());
        let result = verifier(provider.clone())
            .verify(&CredentialCandidate::NoCredential)
            .await;
        assert!(result.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
