//! Metrics for the gateway
//!
//! - [`MetricsRegistry`]: explicitly constructed Prometheus registry
//! - [`RequestTimer`]: per-request duration measurement
//! - [`metrics_endpoint`]: exposition handler for `/metrics`

pub mod endpoint;
pub mod metrics;
pub mod recorder;

pub use endpoint::*;
pub use self::metrics::{RequestLabels, RequestTimer};
pub use recorder::*;
