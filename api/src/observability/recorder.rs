//! Prometheus registry owned by the server
//!
//! The recorder is built, not installed: nothing here touches the global
//! `metrics` recorder. One [`MetricsRegistry`] is created at startup, cloned
//! into every handler through router state and dropped with the server.
//!
//! Process metrics (CPU seconds, resident memory, open fds, start time) come
//! from a `metrics-process` collector that runs against this registry's own
//! recorder on every scrape.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use ::metrics::{Gauge, Histogram, Key, Label, Level, Metadata, Recorder, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use metrics_process::Collector;

use super::metrics::{HTTP_REQUEST_DURATION, PROCESS_UPTIME, RequestLabels, RequestTimer};
use crate::config::MetricsConfig;

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Service name attached to every exported series
pub const SERVICE_LABEL: &str = "gateway-api";

struct Registry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    process: Collector,
    started_at: Instant,
    uptime: Gauge,
}

/// Cloneable handle to the process-wide metrics registry.
///
/// All recording goes through the exporter's internally synchronized
/// storage, so concurrent requests can observe without extra locking.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<Registry>,
}

impl MetricsRegistry {
    pub fn new(config: &MetricsConfig) -> Result<Self> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
                &config.duration_buckets,
            )
            .map_err(|e| anyhow!("Invalid histogram buckets: {}", e))?
            .add_global_label("service", SERVICE_LABEL)
            .build_recorder();
        let handle = recorder.handle();

        recorder.describe_histogram(
            HTTP_REQUEST_DURATION.into(),
            Some(Unit::Seconds),
            "Duration of HTTP requests in seconds".into(),
        );
        recorder.describe_gauge(
            PROCESS_UPTIME.into(),
            Some(Unit::Seconds),
            "Seconds since the process started".into(),
        );

        let process = Collector::default();
        ::metrics::with_local_recorder(&recorder, || process.describe());

        let uptime = recorder.register_gauge(&Key::from_name(PROCESS_UPTIME), &METADATA);

        tracing::info!(
            buckets = ?config.duration_buckets,
            "Prometheus metrics registry initialized"
        );

        Ok(Self {
            inner: Arc::new(Registry {
                recorder,
                handle,
                process,
                started_at: Instant::now(),
                uptime,
            }),
        })
    }

    /// Begin timing one request
    pub fn start_timer(&self) -> RequestTimer {
        RequestTimer::new(self.clone())
    }

    /// Record one completed request into the duration histogram
    pub fn observe_request(&self, labels: &RequestLabels, duration: Duration) {
        self.duration_histogram(labels).record(duration.as_secs_f64());
    }

    fn duration_histogram(&self, labels: &RequestLabels) -> Histogram {
        let key = Key::from_parts(
            HTTP_REQUEST_DURATION,
            vec![
                Label::new("method", labels.method.clone()),
                Label::new("route", labels.route.clone()),
                Label::new("status_code", labels.status_code.to_string()),
            ],
        );
        self.inner.recorder.register_histogram(&key, &METADATA)
    }

    /// Render every series in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let inner = &self.inner;
        ::metrics::with_local_recorder(&inner.recorder, || inner.process.collect());
        inner.uptime.set(inner.started_at.elapsed().as_secs_f64());
        inner.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::tests::sample_count;

    #[test]
    fn test_registry_renders_process_metrics() {
        let registry = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        let output = registry.render();

        assert!(output.contains(PROCESS_UPTIME));
        assert!(output.contains("service=\"gateway-api\""));

        #[cfg(target_os = "linux")]
        for name in [
            "process_cpu_seconds_total",
            "process_resident_memory_bytes",
            "process_open_fds",
            "process_start_time_seconds",
        ] {
            assert!(
                output.lines().any(|line| line.starts_with(name)),
                "missing {name} in:\n{output}"
            );
        }
    }

    #[test]
    fn test_observation_uses_configured_buckets() {
        let config = MetricsConfig {
            duration_buckets: vec![0.25, 4.0],
        };
        let registry = MetricsRegistry::new(&config).unwrap();
        let labels = RequestLabels::new("POST", "/api/process", 200);

        registry.observe_request(&labels, Duration::from_millis(100));
        let output = registry.render();

        assert!(output.contains("# HELP http_request_duration_seconds"));
        assert!(output.contains("le=\"0.25\""));
        assert_eq!(sample_count(&output, "POST", "/api/process", 200), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        let second = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        let labels = RequestLabels::new("POST", "/api/process", 401);

        first.observe_request(&labels, Duration::from_millis(5));

        assert_eq!(sample_count(&first.render(), "POST", "/api/process", 401), 1);
        assert_eq!(sample_count(&second.render(), "POST", "/api/process", 401), 0);
    }

    #[test]
    fn test_rendering_does_not_change_counts() {
        let registry = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        let labels = RequestLabels::new("POST", "/api/process", 500);
        registry.observe_request(&labels, Duration::from_millis(5));

        let first = sample_count(&registry.render(), "POST", "/api/process", 500);
        let second = sample_count(&registry.render(), "POST", "/api/process", 500);
        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }
}
