//! Storage traits for data the auth subsystem reads or appends.
//!
//! This module defines storage interfaces for:
//!
//! - Profiles (user id to platform id)
//! - Seat assignments (platform id to entity and role)
//! - The append-only audit log
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `hms-auth-postgres` - PostgreSQL storage backend

pub mod audit_log;
pub mod profile;
pub mod seat;

pub use audit_log::AuditLogStorage;
pub use profile::ProfileStorage;
pub use seat::SeatStorage;
