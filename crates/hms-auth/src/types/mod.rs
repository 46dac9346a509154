//! Common types used across the authentication and authorization modules.
//!
//! ## Domain Types
//!
//! - [`AuthenticatedUser`] - Resolved, request-scoped caller identity
//! - [`UserEmail`] - Verified or gateway-asserted email address
//! - [`SeatAssignment`] - Read-only record linking a platform identity to an entity and role

pub mod seat;
pub mod user;

pub use seat::SeatAssignment;
pub use user::{AuthenticatedUser, UserEmail, UserValidationError};
