//! Audit log storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::audit::AuditLogEntry;

/// Storage trait for the append-only audit log.
///
/// Entries are written once and never read back by this crate.
#[async_trait]
pub trait AuditLogStorage: Send + Sync {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be persisted.
    async fn append(&self, entry: &AuditLogEntry) -> AuthResult<()>;
}
