use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;
use crate::triggers::firestore_event;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Trigger delivery. Eventarc posts to the service root by default.
        .route("/", post(firestore_event))
        .route("/events/firestore", post(firestore_event))
}
