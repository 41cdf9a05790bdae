//! Conversation lifecycle derived from a remark history.
//!
//! Nothing is stored: state is recomputed from the active remarks on every
//! read. Soft-deleting a terminal remark therefore reopens the conversation
//! without any extra bookkeeping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Remark, RemarkStatus};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Active,
    Closed,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub state: ConversationState,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub latest_status: Option<RemarkStatus>,
    pub active_remarks: usize,
    /// Reminder on the latest active remark, only while the conversation is open.
    pub pending_reminder: Option<DateTime<Utc>>,
}

/// Chronologically last active remark. Ties on `created_at` go to the
/// higher sequence number.
pub fn latest_active(remarks: &[Remark]) -> Option<&Remark> {
    remarks
        .iter()
        .filter(|r| r.is_active)
        .max_by_key(|r| (r.created_at, r.sequence_number))
}

pub fn conversation_state(remarks: &[Remark]) -> ConversationState {
    match latest_active(remarks) {
        Some(last) if last.status.is_terminal() => ConversationState::Closed,
        _ => ConversationState::Active,
    }
}

pub fn summarize(remarks: &[Remark]) -> ConversationSummary {
    let latest = latest_active(remarks);
    let state = conversation_state(remarks);
    let started_at = remarks
        .iter()
        .filter(|r| r.is_active)
        .map(|r| r.created_at)
        .min();
    let ended_at = match state {
        ConversationState::Closed => latest.map(|r| r.created_at),
        ConversationState::Active => None,
    };
    let pending_reminder = match state {
        ConversationState::Active => latest.and_then(|r| r.reminder_date),
        ConversationState::Closed => None,
    };

    ConversationSummary {
        state,
        started_at,
        ended_at,
        latest_status: latest.map(|r| r.status),
        active_remarks: remarks.iter().filter(|r| r.is_active).count(),
        pending_reminder,
    }
}
