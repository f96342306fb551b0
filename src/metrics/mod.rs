// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for the order handlers
// ============================================================================
//
// - Requests per operation and response status
// - Handler latency per operation (store round trip included)
// - Store failures per operation
//
// Exposed via GET /metrics on the local dispatcher.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub requests_total: IntCounterVec,
    pub request_duration: HistogramVec,
    pub store_errors_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("order_requests_total", "Total order handler invocations"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("order_request_duration_seconds", "Order handler duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let store_errors_total = IntCounterVec::new(
            Opts::new("order_store_errors_total", "Total order store failures"),
            &["operation"],
        )?;
        registry.register(Box::new(store_errors_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            store_errors_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one finished handler invocation
    pub fn record_request(&self, operation: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[operation, status.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Helper to record a store failure
    pub fn record_store_error(&self, operation: &str) {
        self.store_errors_total.with_label_values(&[operation]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("list", 200, 0.01);
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_request_by_status() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("get", 200, 0.01);
        metrics.record_request("get", 404, 0.01);
        metrics.record_request("get", 404, 0.02);

        let gathered = metrics.registry().gather();
        let requests = gathered
            .iter()
            .find(|m| m.name() == "order_requests_total")
            .unwrap();
        assert_eq!(requests.metric.len(), 2); // Two different status labels
    }

    #[test]
    fn test_record_store_error() {
        let metrics = Metrics::new().unwrap();
        metrics.record_store_error("create");
        metrics.record_store_error("create");

        let gathered = metrics.registry().gather();
        let errors = gathered
            .iter()
            .find(|m| m.name() == "order_store_errors_total")
            .unwrap();
        assert_eq!(errors.metric[0].counter.value, Some(2.0));
    }
}
