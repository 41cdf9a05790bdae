use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::errors::ValidationError;

/// Combines the reminder date and time form fields into one instant.
///
/// Wall-clock input is interpreted in a single configured fixed offset,
/// never the host's ambient zone. A fixed offset has no DST gaps or folds, so
/// every valid date/time pair maps to exactly one instant.
#[derive(Debug, Clone, Copy)]
pub struct ReminderValidator {
    offset: FixedOffset,
}

impl ReminderValidator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// - date + time: that wall-clock moment
    /// - date only: start of that day
    /// - time only: error
    /// - neither: no reminder
    pub fn combine(
        &self,
        date: Option<&str>,
        time: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>, ValidationError> {
        let date = date.map(str::trim).filter(|s| !s.is_empty());
        let time = time.map(str::trim).filter(|s| !s.is_empty());

        let (date, time) = match (date, time) {
            (None, None) => return Ok(None),
            (None, Some(_)) => return Err(ValidationError::ReminderDateRequired),
            (Some(date), time) => (parse_date(date)?, time.map(parse_time).transpose()?),
        };

        let naive = date.and_time(time.unwrap_or(NaiveTime::MIN));
        let local = naive
            .and_local_timezone(self.offset)
            .single()
            .ok_or_else(|| ValidationError::invalid("reminderTime", "time does not exist"))?;
        Ok(Some(local.with_timezone(&Utc)))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::invalid("reminderDate", format!("'{raw}' is not a YYYY-MM-DD date"))
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ValidationError::invalid("reminderTime", format!("'{raw}' is not an HH:MM time")))
}
