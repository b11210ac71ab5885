use axum::http::{header, HeaderMap};
use serde::Deserialize;
use thiserror::Error;

use super::firestore::{Document, DocumentEventData};

/// CloudEvent type for a newly created Firestore document
pub const DOCUMENT_CREATED: &str = "google.cloud.firestore.document.v1.created";

const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Eventarc's default encoding for Firestore event data
const PROTOBUF_CONTENT_TYPE: &str = "application/protobuf";

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Missing CloudEvent attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Event {0} carries no document")]
    MissingDocument(String),

    #[error("Unsupported event data content type {0}, deliver events as application/json")]
    UnsupportedContentType(String),

    #[error("Invalid document pattern: {0}")]
    InvalidPattern(String),
}

/// CloudEvent context attributes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudEventAttributes {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub source: Option<String>,
    /// `documents/{path}` for Firestore events
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Structured-mode envelope: attributes and data in one JSON body
#[derive(Debug, Deserialize)]
struct StructuredEvent {
    #[serde(flatten)]
    attributes: CloudEventAttributes,
    #[serde(default)]
    data: Option<DocumentEventData>,
}

/// A decoded trigger delivery
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub attributes: CloudEventAttributes,
    pub data: DocumentEventData,
}

impl TriggerEvent {
    /// Decode an HTTP delivery in either binary or structured content mode
    pub fn from_http(headers: &HeaderMap, body: &[u8]) -> Result<Self, TriggerError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with(PROTOBUF_CONTENT_TYPE) {
            return Err(TriggerError::UnsupportedContentType(content_type.to_string()));
        }

        let structured = content_type.starts_with(STRUCTURED_CONTENT_TYPE);

        if structured {
            let event: StructuredEvent = serde_json::from_slice(body)?;
            return Ok(Self {
                attributes: event.attributes,
                data: event.data.unwrap_or_default(),
            });
        }

        let attributes = CloudEventAttributes {
            id: required_header(headers, "ce-id")?,
            event_type: required_header(headers, "ce-type")?,
            source: optional_header(headers, "ce-source"),
            subject: optional_header(headers, "ce-subject"),
            time: optional_header(headers, "ce-time"),
        };

        let data = if body.iter().all(u8::is_ascii_whitespace) {
            DocumentEventData::default()
        } else {
            serde_json::from_slice(body)?
        };

        Ok(Self { attributes, data })
    }

    pub fn id(&self) -> &str {
        &self.attributes.id
    }

    pub fn event_type(&self) -> &str {
        &self.attributes.event_type
    }

    pub fn is_document_created(&self) -> bool {
        self.attributes.event_type == DOCUMENT_CREATED
    }

    /// The created document
    pub fn document(&self) -> Result<&Document, TriggerError> {
        self.data
            .value
            .as_ref()
            .ok_or_else(|| TriggerError::MissingDocument(self.attributes.id.clone()))
    }

    /// Relative document path, from the document name or else the event subject
    pub fn document_path(&self) -> Option<String> {
        if let Some(doc) = &self.data.value {
            return Some(doc.relative_path().to_string());
        }
        self.attributes
            .subject
            .as_deref()
            .map(|s| s.strip_prefix("documents/").unwrap_or(s).to_string())
    }
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, TriggerError> {
    optional_header(headers, name).ok_or(TriggerError::MissingAttribute(name))
}

fn optional_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn binary_headers(event_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("ce-id", HeaderValue::from_static("evt-1"));
        headers.insert("ce-type", HeaderValue::from_static(event_type));
        headers.insert(
            "ce-source",
            HeaderValue::from_static("//firestore.googleapis.com/projects/moth-app/databases/(default)"),
        );
        headers.insert(
            "ce-subject",
            HeaderValue::from_static("documents/notifications/n1"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn body() -> Vec<u8> {
        json!({
            "value": {
                "name": "projects/moth-app/databases/(default)/documents/notifications/n1",
                "fields": {
                    "title": {"stringValue": "Hi"},
                    "body": {"stringValue": "There"},
                    "app_token": {"stringValue": "tok123"}
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_binary_mode() {
        let event = TriggerEvent::from_http(&binary_headers(DOCUMENT_CREATED), &body()).unwrap();

        assert_eq!(event.id(), "evt-1");
        assert!(event.is_document_created());
        assert_eq!(event.document_path().as_deref(), Some("notifications/n1"));
        assert_eq!(event.document().unwrap().fields.len(), 3);
    }

    #[test]
    fn test_binary_mode_missing_type() {
        let mut headers = binary_headers(DOCUMENT_CREATED);
        headers.remove("ce-type");

        let err = TriggerEvent::from_http(&headers, &body()).unwrap_err();
        assert!(matches!(err, TriggerError::MissingAttribute("ce-type")));
    }

    #[test]
    fn test_structured_mode() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/cloudevents+json; charset=utf-8"),
        );
        let envelope = json!({
            "specversion": "1.0",
            "id": "evt-2",
            "type": DOCUMENT_CREATED,
            "source": "//firestore.googleapis.com/projects/moth-app/databases/(default)",
            "subject": "documents/notifications/n2",
            "datacontenttype": "application/json",
            "data": {
                "value": {
                    "name": "projects/moth-app/databases/(default)/documents/notifications/n2",
                    "fields": {}
                }
            }
        });

        let event =
            TriggerEvent::from_http(&headers, envelope.to_string().as_bytes()).unwrap();
        assert_eq!(event.id(), "evt-2");
        assert_eq!(event.document_path().as_deref(), Some("notifications/n2"));
    }

    #[test]
    fn test_path_falls_back_to_subject() {
        let event =
            TriggerEvent::from_http(&binary_headers("google.cloud.firestore.document.v1.deleted"), b"")
                .unwrap();

        assert!(!event.is_document_created());
        assert_eq!(event.document_path().as_deref(), Some("notifications/n1"));
        assert!(matches!(
            event.document(),
            Err(TriggerError::MissingDocument(_))
        ));
    }

    #[test]
    fn test_malformed_body() {
        let err = TriggerEvent::from_http(&binary_headers(DOCUMENT_CREATED), b"{not json")
            .unwrap_err();
        assert!(matches!(err, TriggerError::MalformedPayload(_)));
    }

    #[test]
    fn test_protobuf_data_rejected() {
        let mut headers = binary_headers(DOCUMENT_CREATED);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/protobuf"),
        );

        let err = TriggerEvent::from_http(&headers, b"\x0a\x02").unwrap_err();
        assert!(matches!(err, TriggerError::UnsupportedContentType(ref ct) if ct == "application/protobuf"));
        assert!(err.to_string().contains("application/json"));
    }
}
