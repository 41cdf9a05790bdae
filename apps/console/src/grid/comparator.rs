//! Type-aware comparison of record field values.
//!
//! Every sortable column carries an explicit `FieldKind`; values are coerced
//! into a `SortKey` for that kind once, and keys compare with a total order.
//! Nothing in here fails: missing or malformed values coerce to a fixed
//! fallback (epoch for dates, NaN for numbers, "" for strings).

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    String,
    Number,
}

/// Sub-fields that name a nested object for humans, in preference order.
const READABLE_KEYS: &[&str] = &[
    "name",
    "courseName",
    "companyName",
    "fullName",
    "title",
    "label",
    "email",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Date(DateTime<Utc>),
    Number(f64),
    Text(String),
}

impl SortKey {
    pub fn extract(value: Option<&Value>, kind: FieldKind) -> SortKey {
        match kind {
            FieldKind::Date => SortKey::Date(
                value
                    .and_then(value_instant)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            ),
            FieldKind::Number => SortKey::Number(value.map(value_number).unwrap_or(f64::NAN)),
            FieldKind::String => {
                SortKey::Text(value.map(display_text).unwrap_or_default().to_lowercase())
            }
        }
    }

    /// Total order over keys. NaN sorts after every real number and equals
    /// itself; keys of different variants order Date < Number < Text.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(*a, *b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Date(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn value_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Reads a date field: a date-time string or epoch milliseconds.
pub fn value_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        // typed timestamps on `Record` hold epoch millis as digit strings
        Value::String(s) => parse_instant(s).or_else(|| {
            s.trim()
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
        }),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Parses the date-time shapes the backend emits. Zone-less values are UTC;
/// a bare date is midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Human-readable rendering of a field value, used for string sorting and
/// free-text matching. Nested objects collapse to their readable sub-field
/// instead of their JSON serialization.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => READABLE_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
            .map(display_text)
            .unwrap_or_else(|| {
                map.values()
                    .filter(|v| !v.is_object() && !v.is_array())
                    .map(display_text)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
    }
}
