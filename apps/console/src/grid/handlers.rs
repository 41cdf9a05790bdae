//! Axum route handlers for the record browsers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{AppError, ValidationError};
use crate::grid::browse;
use crate::grid::columns::catalogue;
use crate::grid::comparator::FieldKind;
use crate::grid::pagination::Page;
use crate::grid::query::GridQuery;
use crate::grid::sort::{SortDirection, SortState};
use crate::models::{Record, RecordKind, RemarkStatus};
use crate::remarks::conversation::{summarize, ConversationState};
use crate::remarks::format::{state_label, status_label};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationBadge {
    pub state: ConversationState,
    pub label: &'static str,
    pub latest_status: Option<RemarkStatus>,
    pub latest_status_label: Option<&'static str>,
    pub pending_reminder: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    #[serde(flatten)]
    pub record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationBadge>,
}

impl RowView {
    fn new(kind: RecordKind, record: &Record) -> Self {
        let conversation = kind.has_remarks().then(|| {
            let summary = summarize(&record.remarks);
            ConversationBadge {
                state: summary.state,
                label: state_label(summary.state),
                latest_status: summary.latest_status,
                latest_status_label: summary.latest_status.map(status_label),
                pending_reminder: summary.pending_reminder,
            }
        });
        RowView {
            record: record.clone(),
            conversation,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub sorted: Option<SortDirection>,
    /// Query string that applies this header's sort toggle.
    pub toggle: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub name: &'static str,
    pub value: String,
    /// Query string with this filter removed, back on page 1.
    pub clear: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub kind: RecordKind,
    pub page: Page<RowView>,
    pub sort: SortState,
    pub columns: Vec<ColumnHeader>,
    pub filters: Vec<ActiveFilter>,
    pub clear_search: Option<String>,
    /// Canonical, bookmarkable query for the page being shown.
    pub query: String,
    pub previous: Option<String>,
    pub next: Option<String>,
}

pub fn parse_kind(segment: &str) -> Result<RecordKind, AppError> {
    RecordKind::from_segment(segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown record collection '{segment}'")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/:kind
///
/// Filter, sort and paginate a fresh snapshot of one collection. The query is
/// validated before the backend is contacted.
pub async fn handle_browse(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<GridQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    let kind = parse_kind(&segment)?;
    let plan = query.resolve(
        kind,
        state.config.default_page_size,
        state.config.reminder_offset,
    )?;

    let records = state.store.list_records(kind).await?;
    let page = browse(&records, &plan).map(|record| RowView::new(kind, record));

    let columns = catalogue(kind)
        .columns
        .iter()
        .map(|col| ColumnHeader {
            key: col.key,
            label: col.label,
            kind: col.kind,
            sorted: plan.sort.direction_of(col.key),
            toggle: query
                .clone()
                .with_sort(&plan.sort.select(col.key))
                .to_query_string(),
        })
        .collect();

    let filters = query
        .active_filters()
        .into_iter()
        .map(|(name, value)| ActiveFilter {
            name,
            value: value.to_string(),
            clear: query.clone().with_filter(name, None).to_query_string(),
        })
        .collect();
    let clear_search = query
        .has_search()
        .then(|| query.clone().with_search(None).to_query_string());

    let previous = page
        .has_previous()
        .then(|| query.clone().with_page(page.current_page - 1).to_query_string());
    let next = page
        .has_next()
        .then(|| query.clone().with_page(page.current_page + 1).to_query_string());

    Ok(Json(BrowseResponse {
        kind,
        query: query.clone().with_page(page.current_page).to_query_string(),
        page,
        sort: plan.sort,
        columns,
        filters,
        clear_search,
        previous,
        next,
    }))
}

/// DELETE /api/v1/:kind/:id
///
/// Hard delete. Only intern applications may be removed from the console;
/// every other collection keeps its records.
pub async fn handle_delete_record(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&segment)?;
    if !kind.supports_hard_delete() {
        return Err(ValidationError::invalid(
            "kind",
            format!("{} cannot be deleted from the console", kind.segment()),
        )
        .into());
    }

    state.store.delete_record(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
