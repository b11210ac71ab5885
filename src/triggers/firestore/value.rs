use std::collections::BTreeMap;

use serde::Deserialize;

/// Firestore typed field value as carried in document event payloads
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// 64-bit integers travel as decimal strings
    IntegerValue(Numeric),
    DoubleValue(Numeric),
    BooleanValue(bool),
    NullValue(serde_json::Value),
    TimestampValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// Number that may be encoded as a JSON number or a string (`"42"`, `"NaN"`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    /// The string payload, only for `stringValue`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Render any value as display text.
    ///
    /// Scalars use their natural form, arrays join element text with `,`
    /// and maps render as compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            Value::StringValue(s)
            | Value::TimestampValue(s)
            | Value::BytesValue(s)
            | Value::ReferenceValue(s) => s.clone(),
            Value::IntegerValue(n) => match n {
                Numeric::Number(n) => n.to_string(),
                Numeric::Text(s) => s.clone(),
            },
            Value::DoubleValue(n) => match n {
                Numeric::Number(n) => n
                    .as_f64()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| n.to_string()),
                Numeric::Text(s) => s.clone(),
            },
            Value::BooleanValue(b) => b.to_string(),
            Value::NullValue(_) => "null".to_string(),
            Value::GeoPointValue(p) => format!("{},{}", p.latitude, p.longitude),
            Value::ArrayValue(a) => a
                .values
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::MapValue(_) => self.to_json().to_string(),
        }
    }

    /// Decode into plain JSON, dropping the Firestore type tags
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::StringValue(s)
            | Value::TimestampValue(s)
            | Value::BytesValue(s)
            | Value::ReferenceValue(s) => Json::String(s.clone()),
            Value::IntegerValue(n) => match n {
                Numeric::Number(n) => Json::Number(n.clone()),
                Numeric::Text(s) => s
                    .parse::<i64>()
                    .map(Json::from)
                    .unwrap_or_else(|_| Json::String(s.clone())),
            },
            Value::DoubleValue(n) => match n {
                Numeric::Number(n) => Json::Number(n.clone()),
                Numeric::Text(s) => Json::String(s.clone()),
            },
            Value::BooleanValue(b) => Json::Bool(*b),
            Value::NullValue(_) => Json::Null,
            Value::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            Value::ArrayValue(a) => Json::Array(a.values.iter().map(Value::to_json).collect()),
            Value::MapValue(m) => Json::Object(
                m.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}
