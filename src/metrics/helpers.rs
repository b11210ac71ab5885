//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{EVENTS_TOTAL, PUSH_LATENCY, TOKEN_REFRESH_TOTAL};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording trigger event outcomes
pub struct EventMetrics;

impl EventMetrics {
    /// Notification forwarded to the provider
    pub fn record_sent() {
        EVENTS_TOTAL.with_label_values(&["sent"]).inc();
    }

    /// Provider send failed
    pub fn record_failed() {
        EVENTS_TOTAL.with_label_values(&["failed"]).inc();
    }

    /// Event acknowledged without sending (other event type or path)
    pub fn record_ignored() {
        EVENTS_TOTAL.with_label_values(&["ignored"]).inc();
    }

    /// Event could not be decoded
    pub fn record_rejected() {
        EVENTS_TOTAL.with_label_values(&["rejected"]).inc();
    }
}

/// Helper struct for provider call metrics
pub struct PushMetrics;

impl PushMetrics {
    pub fn record_latency(elapsed: Duration) {
        PUSH_LATENCY.observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for access token metrics
pub struct TokenMetrics;

impl TokenMetrics {
    pub fn record_refresh(source: &str) {
        TOKEN_REFRESH_TOTAL.with_label_values(&[source]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_metrics_recorded() {
        let before = EVENTS_TOTAL.with_label_values(&["ignored"]).get();
        EventMetrics::record_ignored();
        assert!(EVENTS_TOTAL.with_label_values(&["ignored"]).get() > before);
    }

    #[test]
    fn test_encode_metrics() {
        EventMetrics::record_sent();
        PushMetrics::record_latency(Duration::from_millis(42));
        TokenMetrics::record_refresh("static");

        let output = encode_metrics().unwrap();
        assert!(output.contains("forwarder_events_total"));
        assert!(output.contains("forwarder_push_latency_seconds"));
        assert!(output.contains("forwarder_token_refresh_total"));
    }
}
