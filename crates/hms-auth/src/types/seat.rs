//! Seat assignment record.

use serde::{Deserialize, Serialize};

/// A record linking a platform identity to one organizational entity and role.
///
/// Seat lifecycle is managed outside this crate; the resolver only reads
/// rows that are both active and filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    /// Seat identifier.
    pub seat_id: String,

    /// Platform identity occupying the seat.
    pub platform_id: String,

    /// Organizational entity (hospital/site) the seat belongs to.
    pub entity_id: String,

    /// Role identifier attached to the seat, if the role reference resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Whether the seat is currently active.
    #[serde(default)]
    pub active: bool,

    /// Whether the seat is currently filled by its platform identity.
    #[serde(default)]
    pub filled: bool,
}

impl SeatAssignment {
    /// Returns `true` if the seat is both active and filled.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.active && self.filled
    }

    /// Returns the normalized role identifier (trimmed, lowercased), if any.
    #[must_use]
    pub fn normalized_role(&self) -> Option<String> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(role: Option<&str>) -> SeatAssignment {
        SeatAssignment {
            seat_id: "seat-1".to_string(),
            platform_id: "p-1".to_string(),
            entity_id: "hospital-7".to_string(),
            role: role.map(ToString::to_string),
            active: true,
            filled: true,
        }
    }

    #[test]
    fn test_is_occupied() {
        let mut s = seat(None);
        assert!(s.is_occupied());
        s.filled = false;
        assert!(!s.is_occupied());
    }

    #[test]
    fn test_normalized_role() {
        assert_eq!(seat(Some(" Admin ")).normalized_role().as_deref(), Some("admin"));
        assert_eq!(seat(Some("   ")).normalized_role(), None);
        assert_eq!(seat(None).normalized_role(), None);
    }
}
