//! HTTP trigger handler

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};

use crate::error::Result;
use crate::metrics::EventMetrics;
use crate::notification::NotificationRecord;
use crate::server::AppState;
use crate::triggers::TriggerEvent;

use super::models::TriggerResponse;

/// Handle a document event delivered by the platform.
///
/// A 2xx response marks the invocation successful. Provider failures surface
/// as an error response so the platform records the invocation as failed.
#[tracing::instrument(
    name = "trigger.firestore_event",
    skip(state, headers, body),
    fields(event_id = tracing::field::Empty, document = tracing::field::Empty)
)]
pub async fn firestore_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TriggerResponse>> {
    let event = TriggerEvent::from_http(&headers, &body).inspect_err(|e| {
        EventMetrics::record_rejected();
        tracing::warn!(error = %e, "Rejected undecodable event");
    })?;

    let span = tracing::Span::current();
    span.record("event_id", event.id());

    if !event.is_document_created() {
        EventMetrics::record_ignored();
        tracing::info!(event_type = %event.event_type(), "Ignoring non-create event");
        return Ok(Json(TriggerResponse::ignored(
            event.id(),
            event.document_path(),
            format!("unhandled event type {}", event.event_type()),
        )));
    }

    let document = event.document().inspect_err(|_| EventMetrics::record_rejected())?;
    let path = document.relative_path().to_string();
    span.record("document", path.as_str());

    if state.pattern.matches(&path).is_none() {
        EventMetrics::record_ignored();
        tracing::info!(pattern = %state.pattern, "Document outside trigger pattern");
        return Ok(Json(TriggerResponse::ignored(
            event.id(),
            Some(path),
            format!("document does not match {}", state.pattern),
        )));
    }

    let record = NotificationRecord::from_document(document);

    match state.forwarder.forward(&record).await {
        Ok(response) => {
            EventMetrics::record_sent();
            Ok(Json(TriggerResponse::sent(event.id(), path, response.message_id)))
        }
        Err(e) => {
            EventMetrics::record_failed();
            Err(e.into())
        }
    }
}
