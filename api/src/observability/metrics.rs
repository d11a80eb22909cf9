//! Request duration instrumentation
//!
//! A [`RequestTimer`] is started when a request enters a handler and
//! consumed by [`RequestTimer::finish`] once the handler knows its status
//! code. `finish` takes the timer by value, so a request can be recorded at
//! most once; handlers are written so every exit path reaches it.

use std::time::{Duration, Instant};

use super::recorder::MetricsRegistry;

pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const PROCESS_UPTIME: &str = "process_uptime_seconds";

/// Label set of one `http_request_duration_seconds` observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub method: String,
    pub route: String,
    pub status_code: u16,
}

impl RequestLabels {
    pub fn new(method: impl Into<String>, route: impl Into<String>, status_code: u16) -> Self {
        Self {
            method: method.into(),
            route: route.into(),
            status_code,
        }
    }
}

/// In-flight duration measurement for one request
#[must_use = "a timer records nothing until finish() is called"]
pub struct RequestTimer {
    registry: MetricsRegistry,
    started: Instant,
}

impl RequestTimer {
    pub(crate) fn new(registry: MetricsRegistry) -> Self {
        Self {
            registry,
            started: Instant::now(),
        }
    }

    /// Stop the clock and record one observation under `labels`.
    pub fn finish(self, labels: RequestLabels) -> Duration {
        let elapsed = self.started.elapsed();
        self.registry.observe_request(&labels, elapsed);

        tracing::debug!(
            method = %labels.method,
            route = %labels.route,
            status_code = %labels.status_code,
            duration_ms = %elapsed.as_millis(),
            "HTTP request metrics recorded"
        );
        elapsed
    }
}
