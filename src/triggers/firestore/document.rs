use std::collections::BTreeMap;

use serde::Deserialize;

use super::value::Value;

/// A Firestore document snapshot as delivered in a document event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{path}`
    pub name: String,
    /// Raw typed values, decoded only when read
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl Document {
    /// Path relative to the database root, e.g. `notifications/abc`
    pub fn relative_path(&self) -> &str {
        match self.name.split_once("/documents/") {
            Some((_, path)) => path,
            None => &self.name,
        }
    }

    /// Decode one field. Unknown value kinds read as absent.
    pub fn field(&self, name: &str) -> Option<Value> {
        let raw = self.fields.get(name)?;
        match Value::deserialize(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(field = name, error = %e, "Skipping undecodable field");
                None
            }
        }
    }
}

/// Body of a Firestore document event (`google.events.cloud.firestore.v1.DocumentEventData`)
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventData {
    /// Document after the change; absent for deletes
    pub value: Option<Document>,
    /// Document before the change; absent for creates
    pub old_value: Option<Document>,
    pub update_mask: Option<DocumentMask>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    #[serde(default)]
    pub field_paths: Vec<String>,
}
