/// Series normalization.
///
/// SWPC feeds come in two layouts: an array of flat objects, or an array of
/// arrays whose first row is a header. The caller declares which one a feed
/// uses (see `feeds::FeedShape`); nothing here guesses from structure.
///
/// Values are coerced leniently: JSON numbers and numeric strings become
/// field values, everything else is "missing". Source order is preserved.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::feeds::FeedShape;
use crate::model::{FeedError, Series, TimePoint};

// ============================================================================
// Payload
// ============================================================================

/// A decoded feed body, tagged by its declared layout.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPayload {
    Records(Vec<Map<String, Value>>),
    Table {
        header: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl FeedPayload {
    /// Interprets a JSON document as the declared shape.
    ///
    /// Non-object elements of a records payload and non-array rows of a
    /// table are skipped. An empty top-level array is valid for both shapes.
    pub fn from_json(feed_id: &str, shape: FeedShape, value: Value) -> Result<Self, FeedError> {
        let shape_error = || FeedError::Shape {
            feed: feed_id.to_string(),
            expected: match shape {
                FeedShape::Records => "array of objects",
                FeedShape::Table => "array of arrays with header row",
            },
        };

        let Value::Array(items) = value else {
            return Err(shape_error());
        };

        match shape {
            FeedShape::Records => Ok(FeedPayload::Records(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
            )),
            FeedShape::Table => {
                let mut rows = items.into_iter();
                let header = match rows.next() {
                    None => Vec::new(),
                    Some(Value::Array(cols)) => cols
                        .into_iter()
                        .map(|c| match c {
                            Value::String(s) => Ok(s),
                            _ => Err(shape_error()),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(_) => return Err(shape_error()),
                };
                let rows = rows
                    .filter_map(|row| match row {
                        Value::Array(cells) => Some(cells),
                        _ => None,
                    })
                    .collect();
                Ok(FeedPayload::Table { header, rows })
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeedPayload::Records(records) => records.len(),
            FeedPayload::Table { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Builds a `Series` from a payload, reading sample times from `time_key`.
///
/// Table rows are zipped with the header; a row shorter than the header
/// leaves the trailing columns missing, extra cells are ignored.
pub fn normalize(payload: &FeedPayload, time_key: &str) -> Series {
    let points = match payload {
        FeedPayload::Records(records) => records
            .iter()
            .map(|record| {
                to_point(
                    record.iter().map(|(k, v)| (k.as_str(), Some(v))),
                    time_key,
                )
            })
            .collect(),
        FeedPayload::Table { header, rows } => rows
            .iter()
            .map(|row| {
                to_point(
                    header
                        .iter()
                        .enumerate()
                        .map(|(i, name)| (name.as_str(), row.get(i))),
                    time_key,
                )
            })
            .collect(),
    };
    Series::new(points)
}

fn to_point<'a>(
    columns: impl Iterator<Item = (&'a str, Option<&'a Value>)>,
    time_key: &str,
) -> TimePoint {
    let mut timestamp = None;
    let mut fields = BTreeMap::new();
    let mut tags = BTreeMap::new();

    for (name, value) in columns {
        if name == time_key {
            timestamp = value.and_then(Value::as_str).and_then(parse_timestamp);
            continue;
        }
        let number = value.and_then(coerce_number);
        if number.is_none() {
            if let Some(Value::String(s)) = value {
                if !s.trim().is_empty() {
                    tags.insert(name.to_string(), s.trim().to_string());
                }
            }
        }
        fields.insert(name.to_string(), number);
    }

    TimePoint {
        timestamp,
        fields,
        tags,
    }
}

/// Finite number from a JSON number or numeric string, otherwise `None`.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parses the timestamp formats seen across SWPC feeds, as UTC.
///
/// Accepts RFC 3339 with an offset, a trailing `Z`, or no zone marker at all
/// (taken as UTC); `T` or space separators; optional seconds and fractions;
/// plain dates; and `YYYY-MM` month tags (first of the month).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", naive), "%Y-%m-%d"))
        .ok()?;
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

// ============================================================================
// Tests
// ============================================================================
