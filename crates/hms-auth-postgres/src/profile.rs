//! Profile storage for PostgreSQL.
//!
//! Maps an identity-provider user id to the platform-wide id that seat
//! assignments reference.

use sqlx_core::query_scalar::query_scalar;

use crate::{PgPool, StorageResult};

/// Profile lookups against the `profiles` table.
pub struct ProfileStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileStorage<'a> {
    /// Create a new profile storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Returns the platform id of the profile owned by `user_id`.
    ///
    /// Ids are compared as text so the lookup works whether the columns are
    /// `uuid` or `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_platform_id(&self, user_id: &str) -> StorageResult<Option<String>> {
        let platform_id: Option<String> = query_scalar(
            r#"
            SELECT platform_id::text
            FROM profiles
            WHERE user_id::text = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(platform_id.filter(|id| !id.is_empty()))
    }
}
