//! Seat assignment storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::SeatAssignment;

/// Storage trait for seat assignment lookups.
///
/// Seats are owned by another subsystem; this trait is read-only.
#[async_trait]
pub trait SeatStorage: Send + Sync {
    /// Returns every active and filled seat held by `platform_id`.
    ///
    /// The data model expects at most one row, but implementations must
    /// return all matching rows so the caller can detect ambiguity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_active_seats(&self, platform_id: &str) -> AuthResult<Vec<SeatAssignment>>;
}
