//! Named-field rows read from a workbook sheet.

use std::collections::HashMap;

use super::value::Value;

/// One spreadsheet row with named columns, as handed to the reconciliation
/// engine.
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    /// 1-based row number in the sheet (for log messages)
    pub index: usize,
    /// Column header → cell value
    pub values: HashMap<String, Value>,
}

impl SourceRow {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            values: HashMap::new(),
        }
    }

    /// Value of a column, `Value::Null` when the column is absent.
    pub fn value(&self, column: &str) -> Value {
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }
}
