use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::{Remark, RemarkStatus};
use crate::remarks::reminder::ReminderValidator;

/// Remark form as submitted: two separate reminder fields, status as a raw
/// token. Nothing past [`NewRemark::validate`] sees this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkInput {
    pub status: Option<String>,
    pub message: Option<String>,
    pub reminder_date: Option<String>,
    pub reminder_time: Option<String>,
}

/// A validated remark, as sent to the backend.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRemark {
    pub status: RemarkStatus,
    pub message: String,
    pub reminder_date: Option<DateTime<Utc>>,
}

impl NewRemark {
    pub fn validate(
        input: &RemarkInput,
        reminders: &ReminderValidator,
    ) -> Result<NewRemark, ValidationError> {
        let status = input
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingField("status"))?
            .parse::<RemarkStatus>()?;

        let message = input
            .message
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingField("message"))?
            .to_string();

        let reminder_date = reminders.combine(
            input.reminder_date.as_deref(),
            input.reminder_time.as_deref(),
        )?;

        Ok(NewRemark {
            status,
            message,
            reminder_date,
        })
    }
}

/// Read view over a record's remark history.
pub struct RemarkLog<'a> {
    remarks: &'a [Remark],
}

impl<'a> RemarkLog<'a> {
    pub fn new(remarks: &'a [Remark]) -> Self {
        Self { remarks }
    }

    /// Active remarks in sequence order; soft-deleted entries are hidden.
    pub fn visible(&self) -> Vec<&'a Remark> {
        let mut visible: Vec<&Remark> = self.remarks.iter().filter(|r| r.is_active).collect();
        visible.sort_by_key(|r| r.sequence_number);
        visible
    }
}
