//! Source value representation shared by the Excel adapter and the
//! reconciliation engine.

use calamine::Data;
use chrono::NaiveDate;

/// A value read from a workbook cell, used as the incoming side of every
/// field comparison and as the source for write payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty cell
    Null,
    /// Text value (trimmed)
    Text(String),
    /// Whole number
    Int(i64),
    /// Floating point (amounts, rates, hours)
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Calendar date (time-of-day discarded at the cell boundary)
    Date(NaiveDate),
}

impl Value {
    /// Convert a calamine cell to a `Value`.
    ///
    /// Whole floats collapse to `Int` so that `100.0` and `100` read from
    /// different sheets serialize identically.
    pub fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty => Value::Null,
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Value::Null
                } else {
                    Value::Text(trimmed.to_string())
                }
            }
            Data::Int(i) => Value::Int(*i),
            Data::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Value::Int(*f as i64)
                } else {
                    Value::Float(*f)
                }
            }
            Data::Bool(b) => Value::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => Value::Date(ndt.date()),
                None => Value::Null,
            },
            Data::DateTimeIso(s) => parse_date_text(s).map(Value::Date).unwrap_or(Value::Null),
            Data::DurationIso(s) => Value::Text(s.clone()),
            Data::Error(_) => Value::Null,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get a numeric representation
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get a calendar date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_date_text(s),
            _ => None,
        }
    }

    /// Convert to a JSON value for store payloads. Dates serialize as
    /// `YYYY-MM-DD` strings, which the store accepts for date columns.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Parse a date from the text shapes that show up in workbook cells and ISO
/// cell variants.
fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
