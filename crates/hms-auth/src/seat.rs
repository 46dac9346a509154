//! Seat and role resolution.
//!
//! Resolves the organizational context of a verified user in two hops:
//! user id → profile (platform id) → active, filled seat (entity and role).
//!
//! Resolution never fails. Lookups that error are logged and degrade to an
//! unresolved outcome; the caller decides what an unresolved user may do.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::masking::LogMasker;
use crate::storage::{ProfileStorage, SeatStorage};

/// How seat resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatOutcome {
    /// Exactly one active, filled seat was found.
    Seated,
    /// The user has no profile row.
    NoProfile,
    /// The profile exists but holds no active, filled seat.
    NoSeat,
    /// More than one active, filled seat was found; none is used.
    AmbiguousSeats(usize),
    /// A storage lookup failed.
    LookupFailed,
}

impl fmt::Display for SeatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seated => write!(f, "seated"),
            Self::NoProfile => write!(f, "no_profile"),
            Self::NoSeat => write!(f, "no_seat"),
            Self::AmbiguousSeats(n) => write!(f, "ambiguous_seats({n})"),
            Self::LookupFailed => write!(f, "lookup_failed"),
        }
    }
}

/// Result of resolving a user's seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatResolution {
    /// Platform id from the profile, if a profile exists.
    pub platform_id: Option<String>,

    /// Entity of the resolved seat.
    pub entity_id: Option<String>,

    /// Normalized roles of the resolved seat, in resolution order.
    pub roles: IndexSet<String>,

    /// How resolution ended.
    pub outcome: SeatOutcome,
}

impl SeatResolution {
    fn unresolved(platform_id: Option<String>, outcome: SeatOutcome) -> Self {
        Self {
            platform_id,
            entity_id: None,
            roles: IndexSet::new(),
            outcome,
        }
    }

    /// Returns `true` if no role was resolved.
    #[must_use]
    pub fn has_no_roles(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Resolves platform id, entity, and roles for a verified user.
#[derive(Clone)]
pub struct SeatRoleResolver {
    profiles: Arc<dyn ProfileStorage>,
    seats: Arc<dyn SeatStorage>,
    masker: LogMasker,
}

impl SeatRoleResolver {
    /// Creates a resolver over profile and seat storage.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStorage>,
        seats: Arc<dyn SeatStorage>,
        masker: LogMasker,
    ) -> Self {
        Self {
            profiles,
            seats,
            masker,
        }
    }

    /// Resolves the seat of `user_id`.
    pub async fn resolve(&self, user_id: &str) -> SeatResolution {
        let platform_id = match self.profiles.find_platform_id(user_id).await {
            Ok(Some(platform_id)) => platform_id,
            Ok(None) => {
                tracing::debug!(
                    user_id = %self.masker.id(user_id),
                    "No profile for user"
                );
                return SeatResolution::unresolved(None, SeatOutcome::NoProfile);
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %self.masker.id(user_id),
                    error = %e,
                    "Profile lookup failed"
                );
                return SeatResolution::unresolved(None, SeatOutcome::LookupFailed);
            }
        };

        let seats = match self.seats.find_active_seats(&platform_id).await {
            Ok(seats) => seats,
            Err(e) => {
                tracing::warn!(
                    platform_id = %self.masker.id(&platform_id),
                    error = %e,
                    "Seat lookup failed"
                );
                return SeatResolution::unresolved(Some(platform_id), SeatOutcome::LookupFailed);
            }
        };

        // Storage filters already, but the occupancy rule is ours.
        let mut occupied: Vec<_> = seats.into_iter().filter(|s| s.is_occupied()).collect();

        match occupied.len() {
            0 => {
                tracing::debug!(
                    platform_id = %self.masker.id(&platform_id),
                    "No active seat"
                );
                SeatResolution::unresolved(Some(platform_id), SeatOutcome::NoSeat)
            }
            1 => {
                let seat = occupied.remove(0);
                let roles: IndexSet<String> = seat.normalized_role().into_iter().collect();
                tracing::debug!(
                    platform_id = %self.masker.id(&platform_id),
                    entity_id = %self.masker.id(&seat.entity_id),
                    roles = roles.len(),
                    "Seat resolved"
                );
                SeatResolution {
                    platform_id: Some(platform_id),
                    entity_id: Some(seat.entity_id),
                    roles,
                    outcome: SeatOutcome::Seated,
                }
            }
            n => {
                tracing::warn!(
                    platform_id = %self.masker.id(&platform_id),
                    seats = n,
                    "Multiple active seats for one platform identity; ignoring all"
                );
                SeatResolution::unresolved(Some(platform_id), SeatOutcome::AmbiguousSeats(n))
            }
        }
    }
}
