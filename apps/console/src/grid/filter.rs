use chrono::{FixedOffset, NaiveDate};

use crate::errors::ValidationError;
use crate::grid::comparator::{display_text, value_instant};
use crate::models::{Record, RemarkStatus};
use crate::remarks::conversation::latest_active;

/// Inclusive calendar-day range, evaluated in a fixed zone so that a record
/// created late on the `to` day is still inside the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub path: &'static str,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub offset: FixedOffset,
}

impl DateRange {
    pub fn new(
        path: &'static str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: FixedOffset,
    ) -> Result<Self, ValidationError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::InvalidDateRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        Ok(Self {
            path,
            from,
            to,
            offset,
        })
    }

    fn contains(&self, record: &Record) -> bool {
        let Some(instant) = record
            .field(self.path)
            .and_then(|v| value_instant(&v))
        else {
            return false;
        };
        let day = instant.with_timezone(&self.offset).date_naive();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive equality on the rendered value (company, platform).
    Equals { path: &'static str, value: String },
    /// Case-insensitive substring (assigned to).
    Contains { path: &'static str, needle: String },
    Within(DateRange),
    /// Status of the latest active remark.
    LatestStatus(RemarkStatus),
}

impl Criterion {
    pub fn equals(path: &'static str, value: &str) -> Self {
        Criterion::Equals {
            path,
            value: value.trim().to_lowercase(),
        }
    }

    pub fn contains(path: &'static str, needle: &str) -> Self {
        Criterion::Contains {
            path,
            needle: needle.trim().to_lowercase(),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            Criterion::Equals { path, value } => {
                rendered(record, path).trim().to_lowercase() == *value
            }
            Criterion::Contains { path, needle } => {
                rendered(record, path).to_lowercase().contains(needle.as_str())
            }
            Criterion::Within(range) => range.contains(record),
            Criterion::LatestStatus(status) => {
                latest_active(&record.remarks).is_some_and(|r| r.status == *status)
            }
        }
    }
}

fn rendered(record: &Record, path: &str) -> String {
    record
        .field(path)
        .map(|v| display_text(&v))
        .unwrap_or_default()
}

/// Free text plus AND-combined structured criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    text: String,
    search_paths: Vec<&'static str>,
    criteria: Vec<Criterion>,
}

impl RecordFilter {
    pub fn new(search_paths: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            text: String::new(),
            search_paths: search_paths.into_iter().collect(),
            criteria: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.trim().to_lowercase();
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.text.is_empty() && self.criteria.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_text(record) && self.criteria.iter().all(|c| c.matches(record))
    }

    fn matches_text(&self, record: &Record) -> bool {
        if self.text.is_empty() {
            return true;
        }
        self.search_paths
            .iter()
            .any(|path| rendered(record, path).to_lowercase().contains(&self.text))
    }
}

/// Keeps the records matching `filter`, preserving input order.
pub fn filter<'a, I>(records: I, filter: &RecordFilter) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    if filter.is_identity() {
        return records.into_iter().collect();
    }
    records.into_iter().filter(|r| filter.matches(r)).collect()
}
