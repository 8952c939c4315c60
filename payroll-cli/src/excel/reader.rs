//! Single-header sheet reading.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::sync::{SourceRow, Value};

/// Read a sheet whose first row is the header. Rows where every cell is
/// empty are dropped.
pub fn read_table(path: &Path, sheet: &str) -> Result<Vec<SourceRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet: {}", sheet))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        log::warn!("Sheet '{}' of {} is empty", sheet, path.display());
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    let mut rows = Vec::new();
    for (offset, cells) in rows_iter.enumerate() {
        // 1-based sheet row number, past the header
        let row = build_row(offset + 2, &headers, cells);
        if row.values.values().all(Value::is_null) {
            continue;
        }
        rows.push(row);
    }

    log::info!("Read {} rows from sheet '{}' of {}", rows.len(), sheet, path.display());
    Ok(rows)
}

/// Assemble one `SourceRow` from a header list and a cell slice. Columns
/// with an empty header are ignored.
pub(crate) fn build_row(index: usize, headers: &[String], cells: &[Data]) -> SourceRow {
    let mut row = SourceRow::new(index);
    for (i, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let value = cells.get(i).map(Value::from_cell).unwrap_or(Value::Null);
        row.insert(header.clone(), value);
    }
    row
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_row_skips_unnamed_columns() {
        let headers = vec!["Emp No.".to_string(), String::new(), "Name".to_string()];
        let cells = vec![
            Data::String("SF001".to_string()),
            Data::String("junk".to_string()),
            Data::String("ali khan".to_string()),
        ];

        let row = build_row(2, &headers, &cells);

        assert_eq!(row.index, 2);
        assert_eq!(row.values.len(), 2);
        assert_eq!(row.value("Emp No."), Value::Text("SF001".to_string()));
        assert_eq!(row.value("Name"), Value::Text("ali khan".to_string()));
    }

    #[test]
    fn test_build_row_pads_short_rows_with_null() {
        let headers = vec!["Emp No.".to_string(), "Loan Amt".to_string()];
        let cells = vec![Data::String("SF001".to_string())];

        let row = build_row(3, &headers, &cells);

        assert_eq!(row.value("Loan Amt"), Value::Null);
    }
}
