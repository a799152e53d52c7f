//! Registry statistics

pub mod metrics;

pub use metrics::{RegistryMetrics, RegistryStats};
