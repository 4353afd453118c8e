//! Telemetry and observability utilities

#[cfg(feature = "metrics")]
use opentelemetry::{
    metrics::{Counter, Histogram},
    KeyValue,
};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Whether telemetry is enabled
    pub enabled: bool,
    /// Service name for metrics
    pub service_name: String,
    /// Service version for metrics
    pub service_version: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "orchestrate-sdk".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// SDK metrics collector
///
/// Each client owns its own instruments, named after the client's
/// `TelemetryConfig::service_name`. Recording is skipped unless the config
/// was enabled.
#[derive(Clone)]
pub struct Metrics {
    #[cfg(feature = "metrics")]
    enabled: bool,

    #[cfg(feature = "metrics")]
    pub(crate) requests_total: Counter<u64>,

    #[cfg(feature = "metrics")]
    pub(crate) request_duration: Histogram<f64>,

    #[cfg(feature = "metrics")]
    pub(crate) errors_total: Counter<u64>,
}

impl Metrics {
    /// Create new metrics instance
    #[cfg(feature = "metrics")]
    pub fn new(config: &TelemetryConfig) -> Self {
        use opentelemetry::global;

        let meter = global::meter(config.service_name.clone());

        let requests_total = meter
            .u64_counter("orchestrate_sdk.requests_total")
            .with_description("Total number of requests made")
            .init();

        let request_duration = meter
            .f64_histogram("orchestrate_sdk.request_duration_seconds")
            .with_description("Request duration in seconds")
            .init();

        let errors_total = meter
            .u64_counter("orchestrate_sdk.errors_total")
            .with_description("Total number of failed operations by kind")
            .init();

        Self {
            enabled: config.enabled,
            requests_total,
            request_duration,
            errors_total,
        }
    }

    /// Create a no-op metrics instance when feature is disabled
    #[cfg(not(feature = "metrics"))]
    pub fn new(_config: &TelemetryConfig) -> Self {
        Self {}
    }

    /// Record a completed round trip
    #[cfg(feature = "metrics")]
    pub fn record_request(&self, method: &str, status: u16, duration_secs: f64) {
        if !self.enabled {
            return;
        }
        let labels = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];

        self.requests_total.add(1, labels);
        self.request_duration.record(duration_secs, labels);
    }

    /// Record a request (no-op when metrics disabled)
    #[cfg(not(feature = "metrics"))]
    pub fn record_request(&self, _method: &str, _status: u16, _duration_secs: f64) {}

    /// Record a failed operation
    #[cfg(feature = "metrics")]
    pub fn record_error(&self, kind: crate::ErrorKind) {
        if !self.enabled {
            return;
        }
        self.errors_total
            .add(1, &[KeyValue::new("kind", kind.as_str())]);
    }

    /// Record a failed operation (no-op)
    #[cfg(not(feature = "metrics"))]
    pub fn record_error(&self, _kind: crate::ErrorKind) {}
}

impl Metrics {
    /// Whether this collector records anything
    #[cfg(feature = "metrics")]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether this collector records anything
    #[cfg(not(feature = "metrics"))]
    pub fn is_enabled(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
