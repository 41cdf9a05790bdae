use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status carried by every remark. Wire format is lowercase snake_case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RemarkStatus {
    Pending,
    Interested,
    Rejected,
    ConfirmSelected,
    NeedMoreInfo,
    CallbackScheduled,
    NotReachable,
    MeetingScheduled,
    QuoteSent,
}

impl RemarkStatus {
    pub const ALL: [RemarkStatus; 9] = [
        RemarkStatus::Pending,
        RemarkStatus::Interested,
        RemarkStatus::Rejected,
        RemarkStatus::ConfirmSelected,
        RemarkStatus::NeedMoreInfo,
        RemarkStatus::CallbackScheduled,
        RemarkStatus::NotReachable,
        RemarkStatus::MeetingScheduled,
        RemarkStatus::QuoteSent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemarkStatus::Pending => "pending",
            RemarkStatus::Interested => "interested",
            RemarkStatus::Rejected => "rejected",
            RemarkStatus::ConfirmSelected => "confirm_selected",
            RemarkStatus::NeedMoreInfo => "need_more_info",
            RemarkStatus::CallbackScheduled => "callback_scheduled",
            RemarkStatus::NotReachable => "not_reachable",
            RemarkStatus::MeetingScheduled => "meeting_scheduled",
            RemarkStatus::QuoteSent => "quote_sent",
        }
    }

    /// Terminal statuses close the conversation they end.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemarkStatus::Rejected | RemarkStatus::ConfirmSelected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown remark status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for RemarkStatus {
    type Err = UnknownStatus;

    /// Accepts the wire token in any case, with `-` or spaces in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase().replace(['-', ' '], "_");
        RemarkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == token)
            .ok_or_else(|| UnknownStatus(s.trim().to_string()))
    }
}

/// The user who wrote a remark. The backend sends either a bare id or a
/// populated user object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "AuthorWire")]
pub struct Author {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorWire {
    Id(String),
    Populated {
        #[serde(default, rename = "_id")]
        object_id: Option<String>,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl From<AuthorWire> for Author {
    fn from(wire: AuthorWire) -> Self {
        match wire {
            AuthorWire::Id(id) => Author {
                id: Some(id),
                ..Author::default()
            },
            AuthorWire::Populated {
                object_id,
                id,
                name,
                email,
            } => Author {
                id: object_id.or(id),
                name,
                email,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    pub sequence_number: u32,
    pub status: RemarkStatus,
    pub message: String,
    #[serde(default, deserialize_with = "lenient")]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_by: Option<Author>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Optional fields decode to `None` when blank or malformed instead of
/// failing the whole remark.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
