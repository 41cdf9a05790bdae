//! Axum route handlers for record detail and the remark log.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::{AppError, ValidationError};
use crate::grid::handlers::parse_kind;
use crate::models::{Record, RecordKind, Remark, RemarkStatus};
use crate::remarks::conversation::{summarize, ConversationSummary};
use crate::remarks::format::{
    conversation_days, format_instant, reminder_state, state_label, status_label, ReminderState,
};
use crate::remarks::log::{NewRemark, RemarkInput, RemarkLog};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkView {
    pub sequence_number: u32,
    pub status: RemarkStatus,
    pub status_label: &'static str,
    pub message: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
    pub reminder_date: Option<DateTime<Utc>>,
    pub reminder_display: Option<String>,
    pub reminder_state: Option<ReminderState>,
}

impl RemarkView {
    fn new(remark: &Remark, offset: FixedOffset, now: DateTime<Utc>) -> Self {
        RemarkView {
            sequence_number: remark.sequence_number,
            status: remark.status,
            status_label: status_label(remark.status),
            message: remark.message.clone(),
            author: remark
                .created_by
                .as_ref()
                .map(|a| a.display_name().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            created_at: remark.created_at,
            created_at_display: format_instant(remark.created_at, offset),
            reminder_date: remark.reminder_date,
            reminder_display: remark.reminder_date.map(|r| format_instant(r, offset)),
            reminder_state: remark.reminder_date.map(|r| reminder_state(r, now, offset)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    #[serde(flatten)]
    pub summary: ConversationSummary,
    pub label: &'static str,
    pub started_display: Option<String>,
    pub ended_display: Option<String>,
    pub duration_days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    pub kind: RecordKind,
    pub record: Record,
    /// Active remarks only, oldest first.
    pub remarks: Vec<RemarkView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationView>,
}

impl RecordDetail {
    pub fn new(kind: RecordKind, record: Record, offset: FixedOffset, now: DateTime<Utc>) -> Self {
        let remarks = RemarkLog::new(&record.remarks)
            .visible()
            .into_iter()
            .map(|r| RemarkView::new(r, offset, now))
            .collect();

        let conversation = kind.has_remarks().then(|| {
            let summary = summarize(&record.remarks);
            ConversationView {
                label: state_label(summary.state),
                started_display: summary.started_at.map(|t| format_instant(t, offset)),
                ended_display: summary.ended_at.map(|t| format_instant(t, offset)),
                duration_days: conversation_days(summary.started_at, summary.ended_at, now),
                summary,
            }
        });

        RecordDetail {
            kind,
            record,
            remarks,
            conversation,
        }
    }
}

fn remark_kind(segment: &str) -> Result<RecordKind, AppError> {
    let kind = parse_kind(segment)?;
    if !kind.has_remarks() {
        return Err(ValidationError::invalid(
            "kind",
            format!("{} do not carry remarks", kind.segment()),
        )
        .into());
    }
    Ok(kind)
}

/// GET /api/v1/:kind/:id
pub async fn handle_get_record(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<Json<RecordDetail>, AppError> {
    let kind = parse_kind(&segment)?;
    let record = state
        .store
        .list_records(kind)
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.segment())))?;

    Ok(Json(RecordDetail::new(
        kind,
        record,
        state.config.reminder_offset,
        Utc::now(),
    )))
}

/// POST /api/v1/:kind/:id/remarks
///
/// Validates locally, then forwards to the backend while holding the
/// record's in-flight slot. The backend's updated record replaces ours.
pub async fn handle_append_remark(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    Json(input): Json<RemarkInput>,
) -> Result<Json<RecordDetail>, AppError> {
    let kind = remark_kind(&segment)?;
    let remark = NewRemark::validate(&input, &state.reminders)?;

    let _in_flight = state.submissions.try_begin(kind, &id).ok_or_else(|| {
        AppError::Conflict(format!(
            "A remark for {} {id} is already being submitted",
            kind.segment()
        ))
    })?;

    let updated = state.store.append_remark(kind, &id, &remark).await?;
    info!(
        "Remark '{}' added to {} {id}",
        remark.status.as_str(),
        kind.segment()
    );

    Ok(Json(RecordDetail::new(
        kind,
        updated,
        state.config.reminder_offset,
        Utc::now(),
    )))
}

/// DELETE /api/v1/:kind/:id/remarks/:sequence
///
/// Soft delete: the remark stays in the record for audit but leaves the
/// visible log, and the conversation state is recomputed without it.
pub async fn handle_deactivate_remark(
    State(state): State<AppState>,
    Path((segment, id, sequence)): Path<(String, String, u32)>,
) -> Result<Json<RecordDetail>, AppError> {
    let kind = remark_kind(&segment)?;
    let updated = state.store.deactivate_remark(kind, &id, sequence).await?;

    Ok(Json(RecordDetail::new(
        kind,
        updated,
        state.config.reminder_offset,
        Utc::now(),
    )))
}
