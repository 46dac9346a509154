//! Profile storage trait.
//!
//! A profile maps an identity-provider subject id to the stable
//! platform-wide identifier used by seat assignments.

use async_trait::async_trait;

use crate::AuthResult;

/// Storage trait for profile lookups.
///
/// # Example Implementation
///
/// ```ignore
/// use hms_auth::storage::ProfileStorage;
/// use hms_auth::AuthResult;
///
/// struct InMemoryProfiles {
///     profiles: std::sync::RwLock<std::collections::HashMap<String, String>>,
/// }
///
/// #[async_trait::async_trait]
/// impl ProfileStorage for InMemoryProfiles {
///     async fn find_platform_id(&self, user_id: &str) -> AuthResult<Option<String>> {
///         Ok(self.profiles.read().unwrap().get(user_id).cloned())
///     }
/// }
/// ```
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Returns the platform id of the profile owned by `user_id`.
    ///
    /// Returns `Ok(None)` when no profile row exists; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation itself fails.
    async fn find_platform_id(&self, user_id: &str) -> AuthResult<Option<String>>;
}
