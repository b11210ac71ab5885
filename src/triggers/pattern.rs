use std::collections::BTreeMap;
use std::fmt;

use super::TriggerError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
}

/// Document path pattern such as `notifications/{id}`.
///
/// Segments alternate collection/document, so a pattern always has an even
/// number of segments. `{name}` segments match any single non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl DocumentPattern {
    pub fn parse(pattern: &str) -> Result<Self, TriggerError> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(TriggerError::InvalidPattern(format!(
                "empty document pattern '{}'",
                pattern
            )));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            let segment = if let Some(name) = part
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(TriggerError::InvalidPattern(format!(
                        "bad wildcard '{}' in '{}'",
                        part, pattern
                    )));
                }
                Segment::Wildcard(name.to_string())
            } else if part.is_empty() || part.contains(['{', '}']) {
                return Err(TriggerError::InvalidPattern(format!(
                    "bad segment '{}' in '{}'",
                    part, pattern
                )));
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        if segments.len() % 2 != 0 {
            return Err(TriggerError::InvalidPattern(format!(
                "'{}' addresses a collection, not a document",
                pattern
            )));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Match a relative document path, returning the wildcard bindings
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Wildcard(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }

        Some(params)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DocumentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
