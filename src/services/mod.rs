//! Business logic services.

pub mod aggregation;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod metrics;
pub mod period;
pub mod registry;
pub mod trend;
