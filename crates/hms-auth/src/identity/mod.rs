//! Identity verification.
//!
//! Exchanges a raw credential for a verified principal:
//!
//! - [`IdentityProvider`] - the three identity provider calls this crate depends on
//! - [`IdentityVerifier`] - maps a [`CredentialCandidate`](crate::credentials::CredentialCandidate)
//!   to a [`VerifiedIdentity`], never failing
//! - [`HttpIdentityProvider`] - `reqwest` implementation of the provider calls

pub mod http;
pub mod provider;
pub mod verifier;

pub use http::HttpIdentityProvider;
pub use provider::{IdentityProvider, IdentityProviderError, VerifiedIdentity};
pub use verifier::{IdentityVerifier, Verification};
