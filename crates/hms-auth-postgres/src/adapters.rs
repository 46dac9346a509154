//! Arc-owning storage adapters for use with the auth pipeline.
//!
//! These adapters wrap the lifetime-based storage types and own an
//! `Arc<PgPool>`, allowing them to be used as `Arc<dyn Storage>`.

use std::sync::Arc;

use async_trait::async_trait;
use hms_auth::storage::{
    AuditLogStorage as AuditLogStorageTrait, ProfileStorage as ProfileStorageTrait,
    SeatStorage as SeatStorageTrait,
};
use hms_auth::{AuditLogEntry, AuthResult, SeatAssignment};

use crate::PgPool;
use crate::audit_log::AuditLogStorage;
use crate::profile::ProfileStorage;
use crate::seat::{SeatRow, SeatStorage};

// =============================================================================
// Arc-Owning Profile Storage
// =============================================================================

/// Arc-owning PostgreSQL profile storage adapter.
#[derive(Clone)]
pub struct ArcProfileStorage {
    pool: Arc<PgPool>,
}

impl ArcProfileStorage {
    /// Create a new Arc-owning profile storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStorageTrait for ArcProfileStorage {
    async fn find_platform_id(&self, user_id: &str) -> AuthResult<Option<String>> {
        let storage = ProfileStorage::new(&self.pool);
        storage
            .find_platform_id(user_id)
            .await
            .map_err(|e| e.into_auth_error())
    }
}

// =============================================================================
// Arc-Owning Seat Storage
// =============================================================================

/// Arc-owning PostgreSQL seat storage adapter.
#[derive(Clone)]
pub struct ArcSeatStorage {
    pool: Arc<PgPool>,
}

impl ArcSeatStorage {
    /// Create a new Arc-owning seat storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatStorageTrait for ArcSeatStorage {
    async fn find_active_seats(&self, platform_id: &str) -> AuthResult<Vec<SeatAssignment>> {
        let storage = SeatStorage::new(&self.pool);
        let rows = storage
            .find_active_seats(platform_id)
            .await
            .map_err(|e| e.into_auth_error())?;
        Ok(rows.into_iter().map(SeatRow::into_assignment).collect())
    }
}

// =============================================================================
// Arc-Owning Audit Log Storage
// =============================================================================

/// Arc-owning PostgreSQL audit log storage adapter.
#[derive(Clone)]
pub struct ArcAuditLogStorage {
    pool: Arc<PgPool>,
}

impl ArcAuditLogStorage {
    /// Create a new Arc-owning audit log storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStorageTrait for ArcAuditLogStorage {
    async fn append(&self, entry: &AuditLogEntry) -> AuthResult<()> {
        let storage = AuditLogStorage::new(&self.pool);
        storage.append(entry).await.map_err(|e| {
            // The driver message may quote bound ids; only the summary is logged.
            let err = e.into_auth_error();
            tracing::debug!(table = %entry.table_name, error = %err, "Audit insert failed");
            err
        })
    }
}
