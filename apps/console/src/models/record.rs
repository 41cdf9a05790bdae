use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::remark::Remark;

/// The four record shapes the console browses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordKind {
    #[serde(rename = "leads")]
    Lead,
    #[serde(rename = "enrollments")]
    Enrollment,
    #[serde(rename = "intern-applications")]
    InternApplication,
    #[serde(rename = "social-posts")]
    SocialPost,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Lead,
        RecordKind::Enrollment,
        RecordKind::InternApplication,
        RecordKind::SocialPost,
    ];

    /// Path segment used by the console API.
    pub fn segment(&self) -> &'static str {
        match self {
            RecordKind::Lead => "leads",
            RecordKind::Enrollment => "enrollments",
            RecordKind::InternApplication => "intern-applications",
            RecordKind::SocialPost => "social-posts",
        }
    }

    /// Collection path on the CRM backend.
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Lead => "leads",
            RecordKind::Enrollment => "enrollments",
            RecordKind::InternApplication => "intern-applications",
            RecordKind::SocialPost => "social-media",
        }
    }

    pub fn from_segment(segment: &str) -> Option<RecordKind> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.segment() == segment)
    }

    /// Only leads and enrollments carry a conversation log.
    pub fn has_remarks(&self) -> bool {
        matches!(self, RecordKind::Lead | RecordKind::Enrollment)
    }

    pub fn supports_hard_delete(&self) -> bool {
        matches!(self, RecordKind::InternApplication)
    }
}

/// A backend record: a few typed fields plus the untyped field bag the grid
/// engine reads through column paths.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub remarks: Vec<Remark>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Decodes a record without failing on a malformed remark history.
    /// Returns `None` only when the record has no usable id.
    pub fn from_value(value: Value) -> Option<Record> {
        let Value::Object(mut fields) = value else {
            warn!("Dropping record that is not a JSON object");
            return None;
        };

        let object_id = fields.remove("_id");
        let plain_id = fields.remove("id");
        let id = match object_id.or(plain_id) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                warn!("Dropping record without an id");
                return None;
            }
        };

        let created_at = take_string(&mut fields, "createdAt");
        let updated_at = take_string(&mut fields, "updatedAt");
        let remarks = match fields.remove("remarks") {
            Some(Value::Array(items)) => decode_remarks(&id, items),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                warn!("Record {id} has a non-array remarks field; treating as empty");
                Vec::new()
            }
        };

        Some(Record {
            id,
            created_at,
            updated_at,
            remarks,
            fields,
        })
    }

    /// Resolves a dotted column path (`course.courseName`) against the record.
    pub fn field(&self, path: &str) -> Option<Cow<'_, Value>> {
        match path {
            "id" | "_id" => Some(Cow::Owned(Value::String(self.id.clone()))),
            "createdAt" => self
                .created_at
                .as_ref()
                .map(|s| Cow::Owned(Value::String(s.clone()))),
            "updatedAt" => self
                .updated_at
                .as_ref()
                .map(|s| Cow::Owned(Value::String(s.clone()))),
            _ => {
                let mut segments = path.split('.');
                let mut current = self.fields.get(segments.next()?)?;
                for segment in segments {
                    current = current.get(segment)?;
                }
                Some(Cow::Borrowed(current))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Record::from_value(value).ok_or_else(|| serde::de::Error::missing_field("_id"))
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn decode_remarks(record_id: &str, items: Vec<Value>) -> Vec<Remark> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Remark>(item) {
            Ok(remark) => Some(remark),
            Err(e) => {
                warn!("Skipping malformed remark on record {record_id}: {e}");
                None
            }
        })
        .collect()
}
