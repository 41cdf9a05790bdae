use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::models::RemarkStatus;
use crate::remarks::conversation::ConversationState;

pub fn status_label(status: RemarkStatus) -> &'static str {
    match status {
        RemarkStatus::Pending => "Pending",
        RemarkStatus::Interested => "Interested",
        RemarkStatus::Rejected => "Rejected",
        RemarkStatus::ConfirmSelected => "Confirmed / Selected",
        RemarkStatus::NeedMoreInfo => "Need More Info",
        RemarkStatus::CallbackScheduled => "Callback Scheduled",
        RemarkStatus::NotReachable => "Not Reachable",
        RemarkStatus::MeetingScheduled => "Meeting Scheduled",
        RemarkStatus::QuoteSent => "Quote Sent",
    }
}

pub fn state_label(state: ConversationState) -> &'static str {
    match state {
        ConversationState::Active => "Active",
        ConversationState::Closed => "Closed",
    }
}

/// "05 Jan 2024, 03:30 PM" in the console's zone.
pub fn format_instant(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format("%d %b %Y, %I:%M %p")
        .to_string()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Overdue,
    DueToday,
    Upcoming,
}

/// Classifies a reminder against `now`, by calendar day in `offset`.
pub fn reminder_state(
    reminder: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> ReminderState {
    if reminder < now {
        return ReminderState::Overdue;
    }
    let due_day = reminder.with_timezone(&offset).date_naive();
    let today = now.with_timezone(&offset).date_naive();
    if due_day == today {
        ReminderState::DueToday
    } else {
        ReminderState::Upcoming
    }
}

/// Whole days between conversation start and end (or `now` while open).
pub fn conversation_days(
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let start = started_at?;
    Some((ended_at.unwrap_or(now) - start).num_days().max(0))
}
