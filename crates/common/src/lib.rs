//! Shared helpers for the customer service crates: logging setup,
//! Prometheus counters and small wire types.

pub mod metrics;
pub mod types;
pub mod utils;
