//! Grid state as URL query parameters, so a filtered, sorted page is
//! shareable. Absent parameters mean page 1, no filters, default sort.

use chrono::{FixedOffset, NaiveDate};
use reqwest::Url;
use serde::Deserialize;

use crate::errors::ValidationError;
use crate::grid::columns::{catalogue, Column};
use crate::grid::filter::{Criterion, DateRange, RecordFilter};
use crate::grid::pagination::MAX_PAGE_SIZE;
use crate::grid::sort::{SortDirection, SortState};
use crate::models::{RecordKind, RemarkStatus};

const QUERY_BASE: &str = "http://console.local/";

/// Raw query parameters. Numbers stay strings so a mangled `page` falls back
/// to its default instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub company: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A validated query, ready to run against a listing.
#[derive(Debug, Clone)]
pub struct BrowsePlan {
    pub filter: RecordFilter,
    pub sort: SortState,
    pub column: &'static Column,
    pub page: usize,
    pub page_size: usize,
}

impl GridQuery {
    pub fn page_number(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = (page > 1).then(|| page.to_string());
        self
    }

    /// New search text; the result set changed, so back to page 1.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self.page = None;
        self
    }

    pub fn with_sort(mut self, sort: &SortState) -> Self {
        self.sort = Some(sort.field.clone());
        self.dir = Some(sort.direction.as_str().to_string());
        self.page = None;
        self
    }

    /// Sets one named structured filter and resets to page 1.
    pub fn with_filter(mut self, name: &str, value: Option<String>) -> Self {
        match name {
            "company" => self.company = value,
            "platform" => self.platform = value,
            "status" => self.status = value,
            "assignee" => self.assignee = value,
            "from" => self.from = value,
            "to" => self.to = value,
            _ => return self,
        }
        self.page = None;
        self
    }

    /// Structured filters currently set, in query-string order.
    pub fn active_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("company", &self.company),
            ("platform", &self.platform),
            ("status", &self.status),
            ("assignee", &self.assignee),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(name, value)| non_empty(value.as_deref()).map(|v| (name, v)))
        .collect()
    }

    pub fn has_search(&self) -> bool {
        non_empty(self.search.as_deref()).is_some()
    }

    /// Validates every parameter against the record shape's catalogue.
    pub fn resolve(
        &self,
        kind: RecordKind,
        default_page_size: usize,
        offset: FixedOffset,
    ) -> Result<BrowsePlan, ValidationError> {
        let cat = catalogue(kind);

        let sort_field = non_empty(self.sort.as_deref()).unwrap_or(cat.default_sort);
        let column = cat.column(sort_field).ok_or_else(|| {
            ValidationError::invalid(
                "sort",
                format!("'{sort_field}' is not a sortable column of {}", kind.segment()),
            )
        })?;
        let direction = match non_empty(self.dir.as_deref()) {
            Some(dir) => dir.parse::<SortDirection>()?,
            None => SortDirection::Desc,
        };

        let mut filter = RecordFilter::new(cat.search_paths());
        if let Some(text) = non_empty(self.search.as_deref()) {
            filter = filter.with_text(text);
        }
        if let Some(company) = non_empty(self.company.as_deref()) {
            let path = supported(cat.company, "company", kind)?;
            filter = filter.with_criterion(Criterion::equals(path, company));
        }
        if let Some(platform) = non_empty(self.platform.as_deref()) {
            let path = supported(cat.platform, "platform", kind)?;
            filter = filter.with_criterion(Criterion::equals(path, platform));
        }
        if let Some(status) = non_empty(self.status.as_deref()) {
            if !kind.has_remarks() {
                return Err(ValidationError::invalid(
                    "status",
                    format!("the status filter is not available for {}", kind.segment()),
                ));
            }
            filter = filter.with_criterion(Criterion::LatestStatus(status.parse::<RemarkStatus>()?));
        }
        if let Some(assignee) = non_empty(self.assignee.as_deref()) {
            let path = supported(cat.assignee, "assignee", kind)?;
            filter = filter.with_criterion(Criterion::contains(path, assignee));
        }
        let from = parse_day("from", self.from.as_deref())?;
        let to = parse_day("to", self.to.as_deref())?;
        if from.is_some() || to.is_some() {
            let range = DateRange::new(cat.date_field, from, to, offset)?;
            filter = filter.with_criterion(Criterion::Within(range));
        }

        let page_size = match parse_positive(self.page_size.as_deref()) {
            Some(size) if size > MAX_PAGE_SIZE => {
                return Err(ValidationError::invalid(
                    "pageSize",
                    format!("page size {size} is above the maximum of {MAX_PAGE_SIZE}"),
                ));
            }
            Some(size) => size,
            None => default_page_size,
        };

        Ok(BrowsePlan {
            filter,
            sort: SortState::new(column.key, direction),
            column,
            page: self.page_number(),
            page_size,
        })
    }

    /// Canonical query string (no leading `?`); empty parameters and page 1
    /// are omitted.
    pub fn to_query_string(&self) -> String {
        let Ok(mut url) = Url::parse(QUERY_BASE) else {
            return String::new();
        };
        {
            let mut pairs = url.query_pairs_mut();
            let params = [
                ("page", self.page.as_deref().filter(|p| *p != "1")),
                ("pageSize", self.page_size.as_deref()),
                ("search", self.search.as_deref()),
                ("sort", self.sort.as_deref()),
                ("dir", self.dir.as_deref()),
                ("company", self.company.as_deref()),
                ("platform", self.platform.as_deref()),
                ("status", self.status.as_deref()),
                ("assignee", self.assignee.as_deref()),
                ("from", self.from.as_deref()),
                ("to", self.to.as_deref()),
            ];
            for (key, value) in params {
                if let Some(value) = non_empty(value) {
                    pairs.append_pair(key, value);
                }
            }
        }
        url.query().unwrap_or_default().to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    non_empty(value)?.parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_day(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ValidationError::invalid(field, format!("'{raw}' is not a YYYY-MM-DD date")))
        })
        .transpose()
}

fn supported(
    path: Option<&'static str>,
    filter: &'static str,
    kind: RecordKind,
) -> Result<&'static str, ValidationError> {
    path.ok_or_else(|| {
        ValidationError::invalid(
            filter,
            format!("the {filter} filter is not available for {}", kind.segment()),
        )
    })
}
