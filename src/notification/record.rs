use serde::{Deserialize, Serialize};

use crate::fcm::{MessagingPayload, NotificationPayload};
use crate::triggers::firestore::{Document, Value};

pub const TITLE_FIELD: &str = "title";
pub const BODY_FIELD: &str = "body";
pub const APP_TOKEN_FIELD: &str = "app_token";

/// Text shown for an absent `title` or `body`
pub const ABSENT_FIELD_TEXT: &str = "undefined";

/// The fields this service reads from a created notification document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub title: String,
    pub body: String,
    /// Device registration token. Only a string field counts as a token.
    pub app_token: Option<String>,
}

impl NotificationRecord {
    /// Extract the record without validating it.
    ///
    /// `title` and `body` of any type are rendered as text and absent ones read
    /// as `undefined`, so the notification still goes out. A missing or
    /// non-string `app_token` leaves the token unset and the provider rejects
    /// the send.
    pub fn from_document(document: &Document) -> Self {
        let text = |name: &str| {
            document
                .field(name)
                .map(|v| v.to_text())
                .unwrap_or_else(|| ABSENT_FIELD_TEXT.to_string())
        };

        Self {
            title: text(TITLE_FIELD),
            body: text(BODY_FIELD),
            app_token: document
                .field(APP_TOKEN_FIELD)
                .and_then(|v| match v {
                    Value::StringValue(token) => Some(token),
                    _ => None,
                }),
        }
    }

    pub fn to_payload(&self, click_action: &str) -> MessagingPayload {
        MessagingPayload {
            notification: NotificationPayload {
                title: self.title.clone(),
                body: self.body.clone(),
                click_action: click_action.to_string(),
            },
        }
    }
}
