use serde::Serialize;

/// Outcome of a trigger delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerStatus {
    Sent,
    Ignored,
}

/// Response body for a handled trigger event
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: TriggerStatus,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TriggerResponse {
    pub fn sent(event_id: &str, document: String, message_id: String) -> Self {
        Self {
            status: TriggerStatus::Sent,
            event_id: event_id.to_string(),
            document: Some(document),
            message_id: Some(message_id),
            reason: None,
        }
    }

    pub fn ignored(event_id: &str, document: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            status: TriggerStatus::Ignored,
            event_id: event_id.to_string(),
            document,
            message_id: None,
            reason: Some(reason.into()),
        }
    }
}
