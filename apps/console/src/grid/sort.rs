use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::grid::columns::Column;
use crate::grid::comparator::SortKey;
use crate::models::Record;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ValidationError::invalid(
                "dir",
                format!("expected 'asc' or 'desc', got '{other}'"),
            )),
        }
    }
}

/// Which column the grid is ordered by. Header clicks go through
/// [`SortState::select`] so the toggle policy lives in one place.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Same field flips the direction; a new field starts descending.
    pub fn select(&self, field: &str) -> SortState {
        if self.field == field {
            SortState::new(field, self.direction.flipped())
        } else {
            SortState::new(field, SortDirection::Desc)
        }
    }

    /// Direction of `field` if it is the active sort column.
    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        (self.field == field).then_some(self.direction)
    }
}

/// Stable sort over one column. Keys are extracted once per record; records
/// with equal keys keep their input order in either direction.
pub fn sort<'a, I>(records: I, column: &Column, direction: SortDirection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut keyed: Vec<(SortKey, &'a Record)> = records
        .into_iter()
        .map(|record| {
            let key = SortKey::extract(record.field(column.path).as_deref(), column.kind);
            (key, record)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Asc => a.compare(b),
        SortDirection::Desc => b.compare(a),
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}
