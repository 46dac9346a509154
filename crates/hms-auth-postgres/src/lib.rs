//! PostgreSQL storage backend for HMS Auth
//!
//! Provides the data the auth subsystem reads and appends:
//!
//! - Profiles (`profiles`): user id to platform id
//! - Seat assignments (`seat_assignments` joined to `roles`)
//! - The append-only audit log (`audit_logs`)
//!
//! The schema is owned by the application's migrations; this crate only
//! issues reads and the audit append.
//!
//! # Example
//!
//! ```ignore
//! use hms_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/hms", 10).await?;
//!
//! let platform_id = storage.profiles().find_platform_id("3f1c...").await?;
//! ```

pub mod adapters;
pub mod audit_log;
pub mod profile;
pub mod seat;

use std::sync::Arc;

use hms_auth::AuthError;
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use adapters::{ArcAuditLogStorage, ArcProfileStorage, ArcSeatStorage};
pub use audit_log::AuditLogStorage;
pub use profile::ProfileStorage;
pub use seat::{SeatRow, SeatStorage};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during auth storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Converts into the auth crate's storage error.
    ///
    /// Database errors are reduced to their kind; row contents and bound
    /// values never reach the message.
    #[must_use]
    pub fn into_auth_error(self) -> AuthError {
        match self {
            Self::Database(sqlx_core::Error::PoolTimedOut) => {
                AuthError::storage("connection pool timed out")
            }
            Self::Database(sqlx_core::Error::PoolClosed) => {
                AuthError::storage("connection pool closed")
            }
            Self::Database(sqlx_core::Error::Io(_)) => AuthError::storage("database I/O error"),
            Self::Database(sqlx_core::Error::Database(db)) => AuthError::storage(format!(
                "database error (code {})",
                db.code().as_deref().unwrap_or("unknown")
            )),
            Self::Database(_) => AuthError::storage("database error"),
            Self::InvalidInput(message) => AuthError::storage(message),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for authentication data.
///
/// Holds a connection pool and hands out borrowing storage types per table,
/// or Arc-owning adapters for use as trait objects.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Get profile storage operations.
    #[must_use]
    pub fn profiles(&self) -> ProfileStorage<'_> {
        ProfileStorage::new(&self.pool)
    }

    /// Get seat assignment storage operations.
    #[must_use]
    pub fn seats(&self) -> SeatStorage<'_> {
        SeatStorage::new(&self.pool)
    }

    /// Get audit log storage operations.
    #[must_use]
    pub fn audit_logs(&self) -> AuditLogStorage<'_> {
        AuditLogStorage::new(&self.pool)
    }

    // -------------------------------------------------------------------------
    // Trait Object Adapters
    // -------------------------------------------------------------------------

    /// Profile storage as an `hms_auth` trait object.
    #[must_use]
    pub fn profile_adapter(&self) -> Arc<ArcProfileStorage> {
        Arc::new(ArcProfileStorage::new(self.pool_arc()))
    }

    /// Seat storage as an `hms_auth` trait object.
    #[must_use]
    pub fn seat_adapter(&self) -> Arc<ArcSeatStorage> {
        Arc::new(ArcSeatStorage::new(self.pool_arc()))
    }

    /// Audit log storage as an `hms_auth` trait object.
    #[must_use]
    pub fn audit_log_adapter(&self) -> Arc<ArcAuditLogStorage> {
        Arc::new(ArcAuditLogStorage::new(self.pool_arc()))
    }
}

// =============================================================================
// Tests
// =============================================================================
