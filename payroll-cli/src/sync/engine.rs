//! The reconciliation engine.
//!
//! This module handles:
//! - Matching incoming workbook rows against existing store records by
//!   business key
//! - Classifying each row as new, changed or unchanged via the field
//!   comparator
//! - Producing the write-plan (inserts, field-level patches, departed-flag
//!   patches, rate-log entries)
//!
//! The engine is pure: it sees a pre-fetched snapshot of existing records
//! and the remote column set, and never performs I/O itself.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::{Value as JsonValue, json};

use crate::api::StoredRecord;

use super::compare::{Comparison, FieldKind, compare_field, stored_display, stored_f64};
use super::history::{HistoryEvent, history_line, prepend_history};
use super::name::split_full_name;
use super::plan::{Fields, RateLogEntry, RateRemark, RecordPatch, WritePlan};
use super::row::SourceRow;
use super::table::{BusinessKey, FieldMap, IdempotencyPolicy, RowFilter, TableSpec};
use super::value::Value;

/// Textual placeholder some upstream exports leave in cells that lost their
/// value; treated the same as a blank key.
const MISSING_KEY_PLACEHOLDER: &str = "nan";

/// Reconciles one table's incoming rows against its existing records.
pub struct Reconciler<'a> {
    spec: &'a TableSpec,
    period: &'a str,
    today: NaiveDate,
}

impl<'a> Reconciler<'a> {
    /// `today` is injected so history lines are deterministic under test.
    pub fn new(spec: &'a TableSpec, period: &'a str, today: NaiveDate) -> Self {
        Self { spec, period, today }
    }

    /// Classify every incoming row against the existing snapshot and build
    /// the write-plan. `columns` is the remote table's column set; mapped
    /// fields missing from it are omitted from all payloads.
    pub fn build_plan(
        &self,
        rows: &[SourceRow],
        existing: &[StoredRecord],
        columns: &HashSet<String>,
    ) -> WritePlan {
        let mut plan = WritePlan::default();

        if self.spec.policy == IdempotencyPolicy::WholePeriodGuard
            && self.period_already_loaded(existing)
        {
            let reason = format!(
                "records for period '{}' already exist in table '{}'",
                self.period, self.spec.table
            );
            log::error!("{}: {}; skipping the whole batch", self.spec.label, reason);
            plan.aborted = Some(reason);
            return plan;
        }

        let admitted = self.admit_rows(rows, &mut plan);
        let by_key = self.index_existing(existing);

        log::info!(
            "{}: reconciling {} rows against {} existing records",
            self.spec.label,
            admitted.len(),
            by_key.len()
        );

        for (key, row) in &admitted {
            match by_key.get(key.as_str()) {
                None => self.plan_insert(key, row, columns, &mut plan),
                Some(record) => self.plan_diff(key, row, record, columns, &mut plan),
            }
        }

        if self.spec.mark_departed {
            self.mark_departed(&admitted, existing, columns, &mut plan);
        }

        plan
    }

    /// Drop rows that cannot be matched (blank/placeholder keys, filter
    /// misses, amount-less advance rows) and resolve in-batch duplicates by
    /// keeping the last occurrence.
    fn admit_rows<'r>(
        &self,
        rows: &'r [SourceRow],
        plan: &mut WritePlan,
    ) -> Vec<(String, &'r SourceRow)> {
        let mut kept: Vec<(String, &'r SourceRow)> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        'rows: for row in rows {
            let Some(key) = business_key(&row.value(&self.spec.key_source)) else {
                log::warn!(
                    "{}: row {} has an empty employee number; skipping",
                    self.spec.label,
                    row.index
                );
                plan.skipped += 1;
                continue;
            };

            for filter in &self.spec.filters {
                let admitted = match filter {
                    RowFilter::KeyPrefix(prefix) => key.starts_with(prefix.as_str()),
                    RowFilter::Equals { column, value } => {
                        row.value(column).to_string() == *value
                    }
                };
                if !admitted {
                    log::debug!(
                        "{}: row {} ({}) filtered out; skipping",
                        self.spec.label,
                        row.index,
                        key
                    );
                    plan.skipped += 1;
                    continue 'rows;
                }
            }

            if !self.spec.require_any_nonzero.is_empty() && !self.any_amount_present(row) {
                log::info!(
                    "{}: row {} ({}) carries no amounts; skipping",
                    self.spec.label,
                    row.index,
                    key
                );
                plan.skipped += 1;
                continue;
            }

            if let Some(&pos) = position.get(&key) {
                log::warn!(
                    "{}: duplicate employee number {} in the batch; keeping only the last occurrence",
                    self.spec.label,
                    key
                );
                plan.skipped += 1;
                kept[pos] = (key, row);
            } else {
                position.insert(key.clone(), kept.len());
                kept.push((key, row));
            }
        }

        kept
    }

    /// Index the existing snapshot by business key. Period-keyed tables
    /// only consider records of the current period; duplicate keys in the
    /// store keep the first record seen.
    fn index_existing<'r>(&self, existing: &'r [StoredRecord]) -> HashMap<String, &'r StoredRecord> {
        let mut map: HashMap<String, &StoredRecord> = HashMap::new();

        for record in existing {
            if self.spec.key == BusinessKey::EmployeePeriod {
                let period = stored_display(record.field(&self.spec.period_stored));
                if period.trim() != self.period {
                    continue;
                }
            }

            let key = stored_display(record.field(&self.spec.key_stored));
            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            if map.contains_key(key) {
                log::warn!(
                    "{}: duplicate key {} among existing records; keeping the first occurrence",
                    self.spec.label,
                    key
                );
            } else {
                map.insert(key.to_string(), record);
            }
        }

        map
    }

    fn period_already_loaded(&self, existing: &[StoredRecord]) -> bool {
        existing.iter().any(|record| {
            stored_display(record.field(&self.spec.period_stored)).trim() == self.period
        })
    }

    fn plan_insert(
        &self,
        key: &str,
        row: &SourceRow,
        columns: &HashSet<String>,
        plan: &mut WritePlan,
    ) {
        let mut fields = Fields::new();

        if columns.contains(&self.spec.key_stored) {
            fields.insert(self.spec.key_stored.clone(), json!(key));
        }
        if self.spec.key == BusinessKey::EmployeePeriod
            && columns.contains(&self.spec.period_stored)
        {
            fields.insert(self.spec.period_stored.clone(), json!(self.period));
        }

        for map in &self.spec.fields {
            if !columns.contains(&map.stored) {
                continue;
            }
            fields.insert(map.stored.clone(), self.field_json(map, &row.value(&map.source)));
        }

        if let Some(split_map) = &self.spec.name_split {
            let raw = row.value(&split_map.source);
            let split = if raw.is_null() {
                log::warn!(
                    "{}: no '{}' value for {}; name fields will be null",
                    self.spec.label,
                    split_map.source,
                    key
                );
                Default::default()
            } else {
                split_full_name(&raw.to_string())
            };

            for (target, part) in [
                (&split_map.first, split.first),
                (&split_map.middle, split.middle),
                (&split_map.last, split.last),
            ] {
                if columns.contains(target) {
                    fields.insert(
                        target.clone(),
                        part.map(JsonValue::String).unwrap_or(JsonValue::Null),
                    );
                }
            }
        }

        if let Some(history_field) = &self.spec.history_field {
            if columns.contains(history_field) {
                fields.insert(
                    history_field.clone(),
                    json!(history_line(self.today, self.period, &HistoryEvent::Inserted)),
                );
            }
        }

        log::info!("{}: adding new record for {}", self.spec.label, key);
        plan.inserts.push(fields);

        if let Some(rate) = &self.spec.rate {
            let incoming = row.value(&rate.source);
            match incoming.as_f64() {
                Some(value) => plan.rate_logs.push(RateLogEntry {
                    employee: key.to_string(),
                    rate: value,
                    remark: RateRemark::Initial,
                }),
                None => log::warn!(
                    "{}: new employee {} has no valid rate; skipping the initial rate-log entry",
                    self.spec.label,
                    key
                ),
            }
        }
    }

    fn plan_diff(
        &self,
        key: &str,
        row: &SourceRow,
        record: &StoredRecord,
        columns: &HashSet<String>,
        plan: &mut WritePlan,
    ) {
        let mut changed: Vec<(&FieldMap, Value)> = Vec::new();

        for map in &self.spec.fields {
            if map.insert_only || !columns.contains(&map.stored) {
                continue;
            }
            let incoming = row.value(&map.source);
            let stored = record.field(&map.stored);
            if compare_field(&map.stored, map.kind, &incoming, stored) == Comparison::Changed {
                log::debug!(
                    "{}: {} changed for {} ('{}' -> '{}')",
                    self.spec.label,
                    map.stored,
                    key,
                    stored_display(stored),
                    incoming
                );
                changed.push((map, incoming));
            }
        }

        let rate_change = self.detect_rate_change(key, row, record, plan);

        if changed.is_empty() && rate_change.is_none() {
            log::debug!("{}: no update needed for {}", self.spec.label, key);
            plan.unchanged += 1;
            return;
        }

        let mut fields = Fields::new();
        let mut lines: Vec<String> = Vec::new();

        for (map, incoming) in &changed {
            fields.insert(map.stored.clone(), self.field_json(map, incoming));
            lines.push(history_line(
                self.today,
                self.period,
                &HistoryEvent::Updated {
                    field: map.stored.clone(),
                    value: incoming.to_string(),
                },
            ));
        }

        // The rate column is formula-owned: it contributes a history line
        // and a rate-log entry, never a payload field.
        if let Some(new_rate) = &rate_change {
            if let Some(rate) = &self.spec.rate {
                lines.push(history_line(
                    self.today,
                    self.period,
                    &HistoryEvent::Updated {
                        field: rate.stored.clone(),
                        value: new_rate.to_string(),
                    },
                ));
            }
        }

        if let Some(history_field) = &self.spec.history_field {
            if columns.contains(history_field) {
                let existing_history = record.field(history_field).as_str().unwrap_or("");
                fields.insert(
                    history_field.clone(),
                    json!(prepend_history(&lines, existing_history)),
                );
            }
        }

        if fields.is_empty() {
            // Nothing patchable survived (rate-only change on a table
            // without a history column).
            plan.unchanged += 1;
            return;
        }

        log::info!(
            "{}: queueing update for {} ({} change(s))",
            self.spec.label,
            key,
            lines.len()
        );
        plan.patches.push(RecordPatch {
            id: record.id,
            fields,
        });
    }

    /// Apply the asymmetric rate-log policy. A valid incoming rate that
    /// differs from the stored one — or appears where the stored rate is
    /// missing/invalid — is a loggable change. A missing incoming rate
    /// against a valid stored one is informational only: bad workbook data
    /// must not produce a destructive log trail.
    fn detect_rate_change(
        &self,
        key: &str,
        row: &SourceRow,
        record: &StoredRecord,
        plan: &mut WritePlan,
    ) -> Option<Value> {
        let rate = self.spec.rate.as_ref()?;
        let incoming = row.value(&rate.source);
        let new = incoming.as_f64();
        let old = stored_f64(record.field(&rate.stored));

        match (old, new) {
            (Some(old_rate), Some(new_rate)) if old_rate != new_rate => {
                log::info!(
                    "{}: rate change detected for {} ({} -> {})",
                    self.spec.label,
                    key,
                    old_rate,
                    new_rate
                );
                plan.rate_logs.push(RateLogEntry {
                    employee: key.to_string(),
                    rate: new_rate,
                    remark: RateRemark::Change,
                });
                Some(incoming)
            }
            (None, Some(new_rate)) => {
                log::info!(
                    "{}: stored rate for {} is missing or invalid, new rate is {}; logging change",
                    self.spec.label,
                    key,
                    new_rate
                );
                plan.rate_logs.push(RateLogEntry {
                    employee: key.to_string(),
                    rate: new_rate,
                    remark: RateRemark::Change,
                });
                Some(incoming)
            }
            (Some(old_rate), None) => {
                log::info!(
                    "{}: rate for {} is missing in the workbook (stored {}); not logging a rate change",
                    self.spec.label,
                    key,
                    old_rate
                );
                None
            }
            _ => None,
        }
    }

    /// Flag existing employees absent from the incoming batch as departed.
    fn mark_departed(
        &self,
        admitted: &[(String, &SourceRow)],
        existing: &[StoredRecord],
        columns: &HashSet<String>,
        plan: &mut WritePlan,
    ) {
        let Some(left_flag) = &self.spec.left_flag else {
            return;
        };
        if admitted.is_empty() {
            log::info!(
                "{}: no incoming rows; skipping the departed-employee check",
                self.spec.label
            );
            return;
        }
        if !columns.contains(left_flag) {
            log::warn!(
                "{}: column '{}' not present remotely; skipping the departed-employee check",
                self.spec.label,
                left_flag
            );
            return;
        }

        let incoming: HashSet<&str> = admitted.iter().map(|(key, _)| key.as_str()).collect();

        for record in existing {
            let key = stored_display(record.field(&self.spec.key_stored));
            let key = key.trim();
            if key.is_empty() || incoming.contains(key) {
                continue;
            }
            if json_truthy(record.field(left_flag)) {
                log::debug!("{}: employee {} is already marked as left", self.spec.label, key);
                continue;
            }

            let mut fields = Fields::new();
            fields.insert(left_flag.clone(), json!(true));

            if let Some(history_field) = &self.spec.history_field {
                if columns.contains(history_field) {
                    let line = history_line(
                        self.today,
                        self.period,
                        &HistoryEvent::Updated {
                            field: left_flag.clone(),
                            value: "true".to_string(),
                        },
                    );
                    let existing_history = record.field(history_field).as_str().unwrap_or("");
                    fields.insert(
                        history_field.clone(),
                        json!(prepend_history(&[line], existing_history)),
                    );
                }
            }

            log::info!("{}: marking employee {} as left", self.spec.label, key);
            plan.departed.push(RecordPatch {
                id: record.id,
                fields,
            });
        }
    }

    /// At least one of the amount fields named by the spec carries a
    /// non-zero value.
    fn any_amount_present(&self, row: &SourceRow) -> bool {
        self.spec.require_any_nonzero.iter().any(|stored| {
            self.spec
                .field_by_stored(stored)
                .map(|map| row.value(&map.source))
                .and_then(|value| value.as_f64())
                .map(|amount| amount != 0.0)
                .unwrap_or(false)
        })
    }

    fn field_json(&self, map: &FieldMap, incoming: &Value) -> JsonValue {
        if incoming.is_null()
            && self.spec.zero_fill_numeric
            && matches!(map.kind, FieldKind::Numeric | FieldKind::Integer)
        {
            json!(0)
        } else {
            incoming.to_json()
        }
    }
}

/// Canonical business-key text of an incoming cell, or `None` when the row
/// must be dropped (blank or the literal missing-value placeholder).
fn business_key(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let text = value.to_string();
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(MISSING_KEY_PLACEHOLDER) {
        None
    } else {
        Some(text.to_string())
    }
}

fn json_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        JsonValue::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::table::{NameSplitMap, RateSpec, SheetLayout};
    use serde_json::Map;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    fn roster_spec() -> TableSpec {
        TableSpec {
            label: "master",
            table: "Emp_Master".to_string(),
            sheet: "MasterSalarySheet".to_string(),
            layout: SheetLayout::SingleHeader,
            key: BusinessKey::Employee,
            key_source: "Emp No.".to_string(),
            key_stored: "SFNo".to_string(),
            period_stored: "Month_Year".to_string(),
            fields: vec![
                FieldMap::new("Designation", "Designation", FieldKind::Text).insert_only(),
                FieldMap::new("Emp Type : Temp / Perm", "Perm_Temp", FieldKind::Text),
                FieldMap::new("Date of Joining", "DOJ", FieldKind::Date),
            ],
            name_split: Some(NameSplitMap {
                source: "Name".to_string(),
                first: "FirstName".to_string(),
                middle: "MiddleName".to_string(),
                last: "LastName".to_string(),
            }),
            rate: Some(RateSpec {
                source: "Salary Rate (Per Day)".to_string(),
                stored: "Salary_PerDay".to_string(),
            }),
            history_field: Some("RecordHistory".to_string()),
            left_flag: Some("Left".to_string()),
            policy: IdempotencyPolicy::ReconcileRows,
            filters: Vec::new(),
            zero_fill_numeric: false,
            require_any_nonzero: Vec::new(),
            mark_departed: false,
        }
    }

    fn detail_spec(policy: IdempotencyPolicy) -> TableSpec {
        TableSpec {
            label: "detail",
            table: "Detail".to_string(),
            sheet: "Detail".to_string(),
            layout: SheetLayout::SingleHeader,
            key: BusinessKey::EmployeePeriod,
            key_source: "SFNo".to_string(),
            key_stored: "SFNo".to_string(),
            period_stored: "Month_Year".to_string(),
            fields: vec![
                FieldMap::new("P-1", "P_1", FieldKind::Integer),
                FieldMap::new("OT-1", "OT_1", FieldKind::Numeric),
            ],
            name_split: None,
            rate: None,
            history_field: None,
            left_flag: None,
            policy,
            filters: Vec::new(),
            zero_fill_numeric: false,
            require_any_nonzero: Vec::new(),
            mark_departed: false,
        }
    }

    fn all_columns() -> HashSet<String> {
        [
            "SFNo", "Month_Year", "Designation", "Perm_Temp", "DOJ", "Salary_PerDay",
            "FirstName", "MiddleName", "LastName", "RecordHistory", "Left", "P_1", "OT_1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(index: usize, values: &[(&str, Value)]) -> SourceRow {
        let mut row = SourceRow::new(index);
        for (column, value) in values {
            row.insert(*column, value.clone());
        }
        row
    }

    fn record(id: i64, fields: JsonValue) -> StoredRecord {
        let fields: Map<String, JsonValue> = fields.as_object().unwrap().clone();
        StoredRecord { id, fields }
    }

    fn roster_row(emp: &str, rate: Value) -> SourceRow {
        row(
            1,
            &[
                ("Emp No.", Value::Text(emp.to_string())),
                ("Name", Value::Text("ali khan".to_string())),
                ("Designation", Value::Text("Fitter".to_string())),
                ("Emp Type : Temp / Perm", Value::Text("Perm".to_string())),
                ("Salary Rate (Per Day)", rate),
            ],
        )
    }

    fn roster_record(id: i64, emp: &str, rate: JsonValue) -> StoredRecord {
        record(
            id,
            json!({
                "SFNo": emp,
                "Designation": "Fitter",
                "Perm_Temp": "Perm",
                "Salary_PerDay": rate,
                "RecordHistory": "old line",
            }),
        )
    }

    #[test]
    fn test_identical_row_produces_no_writes() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF001", Value::Int(500))];
        let existing = vec![roster_record(7, "SF001", json!(500))];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert!(!plan.has_writes());
        assert_eq!(plan.unchanged, 1);
        assert!(plan.rate_logs.is_empty());
    }

    #[test]
    fn test_new_employee_inserts_and_logs_initial_rate() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF002", Value::Int(600))];

        let plan = engine.build_plan(&rows, &[], &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.patches.is_empty());
        let insert = &plan.inserts[0];
        assert_eq!(insert["SFNo"], json!("SF002"));
        assert_eq!(insert["FirstName"], json!("Ali"));
        assert_eq!(insert["MiddleName"], JsonValue::Null);
        assert_eq!(insert["LastName"], json!("Khan"));
        assert_eq!(insert["RecordHistory"], json!("02-04-2024 Mar-24: Inserted New Record"));
        // The formula-owned rate column is never written.
        assert!(!insert.contains_key("Salary_PerDay"));

        assert_eq!(plan.rate_logs.len(), 1);
        assert_eq!(plan.rate_logs[0].remark, RateRemark::Initial);
        assert_eq!(plan.rate_logs[0].rate, 600.0);
    }

    #[test]
    fn test_new_employee_without_rate_skips_rate_log() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF002", Value::Null)];

        let plan = engine.build_plan(&rows, &[], &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.rate_logs.is_empty());
    }

    #[test]
    fn test_rate_change_patches_history_once_and_logs() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF001", Value::Int(700))];
        let existing = vec![roster_record(7, "SF001", json!(500))];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert_eq!(plan.patches.len(), 1);
        let patch = &plan.patches[0];
        assert_eq!(patch.id, 7);
        // Only the history column is patched; the rate itself is formula-owned.
        assert!(!patch.fields.contains_key("Salary_PerDay"));
        let history = patch.fields["RecordHistory"].as_str().unwrap();
        assert_eq!(
            history,
            "02-04-2024 Mar-24: Updated Salary_PerDay to 700\nold line"
        );

        assert_eq!(plan.rate_logs.len(), 1);
        assert_eq!(plan.rate_logs[0].remark, RateRemark::Change);
        assert_eq!(plan.rate_logs[0].rate, 700.0);
    }

    #[test]
    fn test_missing_incoming_rate_is_not_a_change() {
        // Stored rate present, incoming absent: informational only.
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF001", Value::Null)];
        let existing = vec![roster_record(7, "SF001", json!(500))];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert!(!plan.has_writes());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_missing_stored_rate_logs_change() {
        // Stored rate absent, incoming present: loggable (asymmetric).
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF001", Value::Int(550))];
        let existing = vec![roster_record(7, "SF001", JsonValue::Null)];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert_eq!(plan.rate_logs.len(), 1);
        assert_eq!(plan.rate_logs[0].remark, RateRemark::Change);
        assert_eq!(plan.patches.len(), 1);
    }

    #[test]
    fn test_changed_field_patch_excludes_identity_fields() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let mut incoming = roster_row("SF001", Value::Int(500));
        incoming.insert("Emp Type : Temp / Perm", Value::Text("Temp".to_string()));
        incoming.insert("Designation", Value::Text("Welder".to_string()));

        let existing = vec![roster_record(7, "SF001", json!(500))];
        let plan = engine.build_plan(&[incoming], &existing, &all_columns());

        assert_eq!(plan.patches.len(), 1);
        let patch = &plan.patches[0];
        assert_eq!(patch.fields["Perm_Temp"], json!("Temp"));
        // Insert-only fields stay out of patches even when they differ.
        assert!(!patch.fields.contains_key("Designation"));
        assert!(!patch.fields.contains_key("FirstName"));
        assert!(patch.fields["RecordHistory"]
            .as_str()
            .unwrap()
            .starts_with("02-04-2024 Mar-24: Updated Perm_Temp to Temp"));
    }

    #[test]
    fn test_duplicate_keys_keep_last_occurrence() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let first = roster_row("SF001", Value::Int(500));
        let last = roster_row("SF001", Value::Int(650));

        let plan = engine.build_plan(&[first, last], &[], &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.rate_logs.len(), 1);
        assert_eq!(plan.rate_logs[0].rate, 650.0);
    }

    #[test]
    fn test_blank_and_placeholder_keys_are_skipped() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let blank = roster_row("", Value::Int(500));
        let placeholder = roster_row("nan", Value::Int(500));
        let mut missing = roster_row("SF001", Value::Int(500));
        missing.values.remove("Emp No.");

        let plan = engine.build_plan(&[blank, placeholder, missing], &[], &all_columns());

        assert!(plan.inserts.is_empty());
        assert_eq!(plan.skipped, 3);
    }

    #[test]
    fn test_whole_period_guard_aborts_batch() {
        let spec = detail_spec(IdempotencyPolicy::WholePeriodGuard);
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(
            1,
            &[("SFNo", Value::Text("SF001".to_string())), ("P-1", Value::Int(1))],
        )];
        let existing = vec![record(3, json!({"SFNo": "SF009", "Month_Year": "Mar-24"}))];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert!(plan.aborted.is_some());
        assert!(!plan.has_writes());
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn test_whole_period_guard_passes_other_periods() {
        let spec = detail_spec(IdempotencyPolicy::WholePeriodGuard);
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(
            1,
            &[("SFNo", Value::Text("SF001".to_string())), ("P-1", Value::Int(1))],
        )];
        let existing = vec![record(3, json!({"SFNo": "SF001", "Month_Year": "Feb-24"}))];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert!(plan.aborted.is_none());
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0]["Month_Year"], json!("Mar-24"));
    }

    #[test]
    fn test_period_keyed_reconcile_patches_changed_day() {
        let spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(
            1,
            &[
                ("SFNo", Value::Text("SF001".to_string())),
                ("P-1", Value::Int(1)),
                ("OT-1", Value::Float(2.5)),
            ],
        )];
        let existing = vec![record(
            11,
            json!({"SFNo": "SF001", "Month_Year": "Mar-24", "P_1": 1, "OT_1": 4.0}),
        )];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert_eq!(plan.patches.len(), 1);
        let patch = &plan.patches[0];
        assert_eq!(patch.fields.len(), 1);
        assert_eq!(patch.fields["OT_1"], json!(2.5));
    }

    #[test]
    fn test_existing_other_period_records_are_invisible() {
        let spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(
            1,
            &[("SFNo", Value::Text("SF001".to_string())), ("P-1", Value::Int(1))],
        )];
        // Same employee, previous period: must not match.
        let existing = vec![record(
            11,
            json!({"SFNo": "SF001", "Month_Year": "Feb-24", "P_1": 1}),
        )];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.patches.is_empty());
    }

    #[test]
    fn test_mark_departed_flags_absent_employees() {
        let mut spec = roster_spec();
        spec.mark_departed = true;
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![roster_row("SF001", Value::Int(500))];
        let existing = vec![
            roster_record(7, "SF001", json!(500)),
            roster_record(8, "SF002", json!(450)),
            record(9, json!({"SFNo": "SF003", "Left": true})),
        ];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert_eq!(plan.departed.len(), 1);
        let patch = &plan.departed[0];
        assert_eq!(patch.id, 8);
        assert_eq!(patch.fields["Left"], json!(true));
        assert!(patch.fields["RecordHistory"]
            .as_str()
            .unwrap()
            .contains("Updated Left to true"));
    }

    #[test]
    fn test_mark_departed_skips_on_empty_batch() {
        let mut spec = roster_spec();
        spec.mark_departed = true;
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let existing = vec![roster_record(7, "SF001", json!(500))];

        let plan = engine.build_plan(&[], &existing, &all_columns());

        assert!(plan.departed.is_empty());
    }

    #[test]
    fn test_fields_missing_from_schema_are_omitted() {
        let spec = roster_spec();
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let mut columns = all_columns();
        columns.remove("DOJ");
        columns.remove("MiddleName");

        let mut incoming = roster_row("SF002", Value::Int(600));
        incoming.insert("Date of Joining", Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));

        let plan = engine.build_plan(&[incoming], &[], &columns);

        let insert = &plan.inserts[0];
        assert!(!insert.contains_key("DOJ"));
        assert!(!insert.contains_key("MiddleName"));
        assert!(insert.contains_key("FirstName"));
    }

    #[test]
    fn test_key_prefix_filter_drops_layout_rows() {
        let mut spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        spec.filters = vec![RowFilter::KeyPrefix("SF".to_string())];
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![
            row(1, &[("SFNo", Value::Text("SF001".to_string())), ("P-1", Value::Int(1))]),
            row(2, &[("SFNo", Value::Text("Total".to_string())), ("P-1", Value::Int(99))]),
        ];

        let plan = engine.build_plan(&rows, &[], &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_require_any_nonzero_skips_amountless_rows() {
        let mut spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        spec.fields = vec![
            FieldMap::new("Advance Amount", "Advance_Amt", FieldKind::Numeric),
            FieldMap::new("Loan Amt", "Loan_Amt", FieldKind::Numeric),
        ];
        spec.require_any_nonzero = vec!["Advance_Amt".to_string(), "Loan_Amt".to_string()];
        let mut columns = all_columns();
        columns.insert("Advance_Amt".to_string());
        columns.insert("Loan_Amt".to_string());
        let engine = Reconciler::new(&spec, "Mar-24", today());

        let rows = vec![
            row(1, &[
                ("SFNo", Value::Text("SF001".to_string())),
                ("Advance Amount", Value::Int(0)),
                ("Loan Amt", Value::Null),
            ]),
            row(2, &[
                ("SFNo", Value::Text("SF002".to_string())),
                ("Advance Amount", Value::Int(1500)),
            ]),
        ];

        let plan = engine.build_plan(&rows, &[], &columns);

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0]["SFNo"], json!("SF002"));
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_equals_filter_admits_matching_rows_only() {
        let mut spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        spec.filters = vec![RowFilter::Equals {
            column: "Emp Type".to_string(),
            value: "Perm".to_string(),
        }];
        let engine = Reconciler::new(&spec, "Mar-24", today());

        let rows = vec![
            row(1, &[
                ("SFNo", Value::Text("SF001".to_string())),
                ("Emp Type", Value::Text("Perm".to_string())),
                ("P-1", Value::Int(1)),
            ]),
            row(2, &[
                ("SFNo", Value::Text("SF002".to_string())),
                ("Emp Type", Value::Text("Temp".to_string())),
                ("P-1", Value::Int(1)),
            ]),
        ];

        let plan = engine.build_plan(&rows, &[], &all_columns());

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0]["SFNo"], json!("SF001"));
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_zero_fill_applies_on_insert() {
        let mut spec = detail_spec(IdempotencyPolicy::WholePeriodGuard);
        spec.zero_fill_numeric = true;
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(1, &[("SFNo", Value::Text("SF001".to_string()))])];

        let plan = engine.build_plan(&rows, &[], &all_columns());

        assert_eq!(plan.inserts[0]["P_1"], json!(0));
        assert_eq!(plan.inserts[0]["OT_1"], json!(0));
    }

    #[test]
    fn test_indeterminate_comparison_is_not_a_change() {
        let spec = detail_spec(IdempotencyPolicy::ReconcileRows);
        let engine = Reconciler::new(&spec, "Mar-24", today());
        let rows = vec![row(
            1,
            &[
                ("SFNo", Value::Text("SF001".to_string())),
                ("OT-1", Value::Text("n/a".to_string())),
            ],
        )];
        let existing = vec![record(
            11,
            json!({"SFNo": "SF001", "Month_Year": "Mar-24", "OT_1": 4.0, "P_1": null}),
        )];

        let plan = engine.build_plan(&rows, &existing, &all_columns());

        assert!(plan.patches.is_empty());
        assert_eq!(plan.unchanged, 1);
    }
}
