//! Prometheus metrics registry.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Total HTTP requests by path and response status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["path", "status"]
    )
    .unwrap();

    /// Webhook processing results: created, duplicate, invalid_signature,
    /// validation_error.
    pub static ref WEBHOOK_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "webhook_requests_total",
        "Webhook processing results",
        &["result"]
    )
    .unwrap();

    /// Request latency in milliseconds.
    pub static ref REQUEST_LATENCY_MS: Histogram = register_histogram!(
        "request_latency_ms",
        "Request latency",
        vec![100.0, 300.0, 500.0, 1000.0, 2000.0]
    )
    .unwrap();
}

pub fn record_http_request(path: &str, status: u16, latency_ms: u64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[path, &status.to_string()])
        .inc();
    REQUEST_LATENCY_MS.observe(latency_ms as f64);
}

pub fn record_webhook_result(result: &str) {
    WEBHOOK_REQUESTS_TOTAL.with_label_values(&[result]).inc();
}

/// Render the default registry in the text exposition format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut output = String::new();
    if let Err(e) = encoder.encode_utf8(&prometheus::gather(), &mut output) {
        tracing::error!("failed to encode metrics: {}", e);
    }
    output
}
