//! Table-specific reconciliation configuration.
//!
//! The six near-identical per-table updaters of the legacy job collapse into
//! one engine parameterized by these specs: business key, field mapping,
//! idempotency policy and the handful of per-table quirks become data.

use super::compare::FieldKind;

/// How incoming rows are matched against existing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessKey {
    /// Employee identifier alone (master roster)
    Employee,
    /// (employee identifier, reporting period) pair (detail tables)
    EmployeePeriod,
}

/// What happens when a reporting period has already been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyPolicy {
    /// Classify every row as new/changed/unchanged against existing records
    ReconcileRows,
    /// Abort the whole batch if any record for the period already exists
    WholePeriodGuard,
}

/// Mapping of one workbook column to one stored field.
#[derive(Debug, Clone)]
pub struct FieldMap {
    /// Workbook column header
    pub source: String,
    /// Remote column name
    pub stored: String,
    pub kind: FieldKind,
    /// Written on insert only, never patched (identity fields)
    pub insert_only: bool,
}

impl FieldMap {
    pub fn new(source: impl Into<String>, stored: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            source: source.into(),
            stored: stored.into(),
            kind,
            insert_only: false,
        }
    }

    pub fn insert_only(mut self) -> Self {
        self.insert_only = true;
        self
    }
}

/// Pay-rate tracking for tables that feed the rate-change log.
///
/// The stored rate column is formula-owned on the remote side: it drives
/// change detection, history lines and rate-log entries, but is never
/// written.
#[derive(Debug, Clone)]
pub struct RateSpec {
    pub source: String,
    pub stored: String,
}

/// Splitting of one free-text name column into stored name parts, applied on
/// insert only.
#[derive(Debug, Clone)]
pub struct NameSplitMap {
    pub source: String,
    pub first: String,
    pub middle: String,
    pub last: String,
}

/// Row-level admission filters applied before matching.
#[derive(Debug, Clone)]
pub enum RowFilter {
    /// Business key must start with this prefix (drops totals/layout rows)
    KeyPrefix(String),
    /// A column must hold exactly this text
    Equals { column: String, value: String },
}

/// Everything the engine needs to reconcile one table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Short label for logs and the summary report
    pub label: &'static str,
    /// Remote table name
    pub table: String,
    /// Workbook sheet feeding this table
    pub sheet: String,
    /// Sheet layout handled by the Excel adapter
    pub layout: SheetLayout,
    pub key: BusinessKey,
    /// Workbook column holding the employee identifier
    pub key_source: String,
    /// Stored field holding the employee identifier
    pub key_stored: String,
    /// Stored field holding the reporting period
    pub period_stored: String,
    pub fields: Vec<FieldMap>,
    pub name_split: Option<NameSplitMap>,
    pub rate: Option<RateSpec>,
    /// Append-only history text field, if the table carries one
    pub history_field: Option<String>,
    /// Boolean "left employment" flag field (master only)
    pub left_flag: Option<String>,
    pub policy: IdempotencyPolicy,
    pub filters: Vec<RowFilter>,
    /// Write absent numeric fields as 0 instead of null on insert
    pub zero_fill_numeric: bool,
    /// Skip rows where all of these stored fields are absent or zero
    pub require_any_nonzero: Vec<String>,
    /// Run the departed-employees post-pass after reconciling
    pub mark_departed: bool,
}

/// How the sheet's header is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    /// First row is the header
    SingleHeader,
    /// Two-row hour-clock header with per-day column pairs
    HourClock,
}

impl TableSpec {
    /// Mapping whose stored name is `stored`, if any.
    pub fn field_by_stored(&self, stored: &str) -> Option<&FieldMap> {
        self.fields.iter().find(|f| f.stored == stored)
    }
}
