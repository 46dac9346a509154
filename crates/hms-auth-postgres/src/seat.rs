//! Seat assignment storage for PostgreSQL.

use hms_auth::SeatAssignment;
use sqlx_core::query_as::query_as;

use crate::{PgPool, StorageResult};

// =============================================================================
// Types
// =============================================================================

/// Seat assignment row joined with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRow {
    /// Seat identifier.
    pub seat_id: String,
    /// Platform identity occupying the seat.
    pub platform_id: String,
    /// Organizational entity of the seat.
    pub entity_id: String,
    /// Role name, `None` when the seat has no role or the role row is missing.
    pub role_name: Option<String>,
    /// `seat_assignments.is_active`.
    pub is_active: bool,
    /// `seat_assignments.is_filled`.
    pub is_filled: bool,
}

impl SeatRow {
    /// Create from database tuple.
    fn from_tuple(row: (String, String, String, Option<String>, bool, bool)) -> Self {
        Self {
            seat_id: row.0,
            platform_id: row.1,
            entity_id: row.2,
            role_name: row.3,
            is_active: row.4,
            is_filled: row.5,
        }
    }

    /// Converts into the auth crate's seat record.
    #[must_use]
    pub fn into_assignment(self) -> SeatAssignment {
        SeatAssignment {
            seat_id: self.seat_id,
            platform_id: self.platform_id,
            entity_id: self.entity_id,
            role: self.role_name,
            active: self.is_active,
            filled: self.is_filled,
        }
    }
}

// =============================================================================
// Seat Storage
// =============================================================================

/// Seat assignment lookups against `seat_assignments` and `roles`.
pub struct SeatStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> SeatStorage<'a> {
    /// Create a new seat storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Returns every active and filled seat held by `platform_id`.
    ///
    /// All matching rows are returned; the resolver decides what several
    /// rows mean.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_seats(&self, platform_id: &str) -> StorageResult<Vec<SeatRow>> {
        let rows: Vec<(String, String, String, Option<String>, bool, bool)> = query_as(
            r#"
            SELECT s.id::text,
                   s.platform_id::text,
                   s.entity_id::text,
                   r.name,
                   s.is_active,
                   s.is_filled
            FROM seat_assignments s
            LEFT JOIN roles r ON r.id = s.role_id
            WHERE s.platform_id::text = $1
              AND s.is_active
              AND s.is_filled
            ORDER BY s.id
            "#,
        )
        .bind(platform_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SeatRow::from_tuple).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
