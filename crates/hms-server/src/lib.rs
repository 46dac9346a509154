pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use server::{AppState, HmsServer, ServerBuilder, build_app};
