//! Prometheus metrics for the forwarder.
//!
//! - Event metrics (sent, failed, ignored, rejected invocations)
//! - Push latency (time spent in the provider send call)
//! - Access token refreshes by credential source

mod helpers;

pub use helpers::{encode_metrics, EventMetrics, PushMetrics, TokenMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "forwarder";

lazy_static! {
    /// Trigger events by outcome
    pub static ref EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_events_total", METRIC_PREFIX),
        "Total trigger events handled, by outcome",
        &["outcome"]
    ).unwrap();

    /// Provider send latency
    pub static ref PUSH_LATENCY: Histogram = register_histogram!(
        format!("{}_push_latency_seconds", METRIC_PREFIX),
        "Latency of the provider send call in seconds",
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Access token refreshes by credential source
    pub static ref TOKEN_REFRESH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_token_refresh_total", METRIC_PREFIX),
        "Total OAuth2 access token refreshes",
        &["source"]
    ).unwrap();
}
