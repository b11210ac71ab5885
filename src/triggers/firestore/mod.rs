//! Firestore document event payloads

mod document;
mod value;

pub use document::{Document, DocumentEventData, DocumentMask};
pub use value::{ArrayValue, LatLng, MapValue, Numeric, Value};
