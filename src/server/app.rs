use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::api::api_routes;

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit_bytes;

    Router::new()
        .merge(api_routes())
        // Add middleware
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}
