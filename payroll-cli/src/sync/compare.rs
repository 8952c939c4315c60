//! Type-aware field comparison between incoming workbook values and stored
//! record values.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use super::value::Value;

/// The declared kind of a mapped field, driving comparison and payload
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, compared by string representation
    Text,
    /// Decimal amount/rate, compared numerically with exact equality
    Numeric,
    /// Whole-number count, compared numerically with exact equality
    Integer,
    /// Calendar date, compared at date granularity (time-of-day discarded)
    Date,
}

/// Outcome of comparing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Unchanged,
    Changed,
    /// One side could not be converted to the field's kind. The engine
    /// treats this as "no update for this field", never as a fatal error.
    Indeterminate,
}

/// Compare an incoming value against the stored value for `field`.
///
/// Precedence: both null → unchanged; exactly one null → changed; then the
/// kind-specific comparison.
pub fn compare_field(field: &str, kind: FieldKind, incoming: &Value, stored: &JsonValue) -> Comparison {
    let incoming_null = incoming.is_null();
    let stored_null = stored.is_null() || matches!(stored, JsonValue::String(s) if s.trim().is_empty());

    if incoming_null && stored_null {
        return Comparison::Unchanged;
    }
    if incoming_null != stored_null {
        return Comparison::Changed;
    }

    match kind {
        FieldKind::Date => {
            let new_date = incoming.as_date();
            let old_date = stored_date(stored);
            match (new_date, old_date) {
                (Some(n), Some(o)) => changed_if(n != o),
                _ => {
                    log::warn!(
                        "Could not normalize '{}' to a date (incoming: {}, stored: {}); leaving field untouched",
                        field,
                        incoming,
                        stored
                    );
                    Comparison::Indeterminate
                }
            }
        }
        FieldKind::Numeric | FieldKind::Integer => {
            let new_num = incoming.as_f64();
            let old_num = stored_f64(stored);
            match (new_num, old_num) {
                (Some(n), Some(o)) => changed_if(n != o),
                _ => {
                    log::warn!(
                        "Could not convert '{}' to a number (incoming: {}, stored: {}); leaving field untouched",
                        field,
                        incoming,
                        stored
                    );
                    Comparison::Indeterminate
                }
            }
        }
        FieldKind::Text => changed_if(incoming.to_string() != stored_display(stored)),
    }
}

fn changed_if(changed: bool) -> Comparison {
    if changed { Comparison::Changed } else { Comparison::Unchanged }
}

/// Numeric view of a stored JSON value.
pub fn stored_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Calendar-date view of a stored JSON value.
///
/// The store serializes date columns as Unix seconds; older rows and text
/// columns come back as ISO strings. Either way the time-of-day portion is
/// discarded.
pub fn stored_date(value: &JsonValue) -> Option<NaiveDate> {
    match value {
        JsonValue::Number(n) => {
            let secs = n.as_f64()? as i64;
            chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                return Some(dt.date_naive());
            }
            for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
                if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(ndt.date());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

/// String representation of a stored JSON value, for text comparison and
/// history lines.
pub fn stored_display(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
