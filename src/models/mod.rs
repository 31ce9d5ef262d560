//! Database models and DTOs for all domain entities.

pub mod metrics;
pub mod security_control;
pub mod server;
pub mod technician;
pub mod user;
