//! Trigger delivery: CloudEvent decoding, Firestore payloads and document path matching.

mod event;
pub mod firestore;
mod http;
mod pattern;

pub use event::{CloudEventAttributes, TriggerError, TriggerEvent, DOCUMENT_CREATED};
pub use http::{firestore_event, TriggerResponse, TriggerStatus};
pub use pattern::DocumentPattern;
