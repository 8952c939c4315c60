//! Write-plans produced by a reconciliation pass.
//!
//! A plan is pure data: the executor turns it into bulk store calls, tests
//! assert on it directly.

use serde_json::{Map, Value as JsonValue, json};

/// Field payload of one record, keyed by stored column name.
pub type Fields = Map<String, JsonValue>;

/// A field-level patch against one existing record.
#[derive(Debug, Clone)]
pub struct RecordPatch {
    pub id: i64,
    pub fields: Fields,
}

/// Why a rate-log entry was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRemark {
    /// First sighting of the employee
    Initial,
    /// Observed change to an existing employee's rate
    Change,
}

impl RateRemark {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateRemark::Initial => "Initial Rate",
            RateRemark::Change => "Rate Change",
        }
    }
}

/// One queued append-only rate-log row.
#[derive(Debug, Clone)]
pub struct RateLogEntry {
    pub employee: String,
    pub rate: f64,
    pub remark: RateRemark,
}

impl RateLogEntry {
    /// Wire fields for the rate-log table; the reporting period is recorded
    /// in the entry's history column.
    pub fn to_fields(&self, period: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("SFNo".to_string(), json!(self.employee));
        fields.insert("NewPerDayRate".to_string(), json!(self.rate));
        fields.insert("Remarks".to_string(), json!(self.remark.as_str()));
        fields.insert("RecordHistory".to_string(), json!(period));
        fields
    }
}

/// Everything one table's reconciliation pass decided to write.
#[derive(Debug, Clone, Default)]
pub struct WritePlan {
    /// New records, full field payloads
    pub inserts: Vec<Fields>,
    /// Changed records, changed fields only
    pub patches: Vec<RecordPatch>,
    /// Departed-employee flag patches (master post-pass)
    pub departed: Vec<RecordPatch>,
    /// Queued rate-change log rows
    pub rate_logs: Vec<RateLogEntry>,
    /// Rows dropped before matching (blank keys, duplicates, filters)
    pub skipped: usize,
    /// Matched rows with no field changes
    pub unchanged: usize,
    /// Set when the whole batch was refused (period already loaded)
    pub aborted: Option<String>,
}

impl WritePlan {
    /// Whether the plan carries any store writes at all.
    pub fn has_writes(&self) -> bool {
        !self.inserts.is_empty()
            || !self.patches.is_empty()
            || !self.departed.is_empty()
            || !self.rate_logs.is_empty()
    }
}
