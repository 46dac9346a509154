//! Audit log storage for PostgreSQL.
//!
//! Append-only: rows are inserted and never read back or updated here.

use hms_auth::AuditLogEntry;
use sqlx_core::query::query;

use crate::{PgPool, StorageError, StorageResult};

/// Appends to the `audit_logs` table.
pub struct AuditLogStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogStorage<'a> {
    /// Create a new audit log storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is invalid or the insert fails.
    pub async fn append(&self, entry: &AuditLogEntry) -> StorageResult<()> {
        if entry.table_name.trim().is_empty() {
            return Err(StorageError::invalid_input("audit entry without table name"));
        }

        query(
            r#"
            INSERT INTO audit_logs (action, table_name, record_id, user_id, changes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.action.as_str())
        .bind(&entry.table_name)
        .bind(entry.record_id.as_deref())
        .bind(entry.user_id.as_deref())
        .bind(&entry.changes)
        .bind(entry.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
