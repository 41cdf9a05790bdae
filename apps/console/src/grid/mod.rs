// Record browsing engine shared by every list page.
// Pipeline: filter -> sort -> paginate. All steps are pure and never fail on
// malformed records; per-shape knowledge lives in `columns`.

pub mod columns;
pub mod comparator;
pub mod filter;
pub mod handlers;
pub mod pagination;
pub mod query;
pub mod sort;

use crate::grid::pagination::{paginate, Page};
use crate::grid::query::BrowsePlan;
use crate::models::Record;

/// Runs a validated plan over a snapshot and returns the visible page.
pub fn browse<'a>(records: &'a [Record], plan: &BrowsePlan) -> Page<&'a Record> {
    let matched = filter::filter(records, &plan.filter);
    let ordered = sort::sort(matched, plan.column, plan.sort.direction);
    paginate(&ordered, plan.page, plan.page_size)
}
