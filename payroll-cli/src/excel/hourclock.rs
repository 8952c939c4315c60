//! Hour-clock sheet reading.
//!
//! The attendance sheet uses a two-row header: day numbers in the first
//! row, "P"/"OT" captions in the second, merged over three fixed leading
//! columns. Column names are synthesized instead of read: `No`, `SFNo`,
//! `Name`, then alternating `P-{day}`/`OT-{day}` pairs out to the sheet's
//! width.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Reader, Xlsx, open_workbook};

use crate::sync::{SourceRow, Value};

use super::reader::build_row;

/// Rows of header before the data starts.
const HEADER_ROWS: usize = 2;

/// Read the hour-clock sheet, skipping its two header rows.
pub fn read_hour_clock(path: &Path, sheet: &str) -> Result<Vec<SourceRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet: {}", sheet))?;

    let headers = day_column_headers(range.width());
    log::debug!("Synthesized {} hour-clock column names", headers.len());

    let mut rows = Vec::new();
    for (offset, cells) in range.rows().enumerate().skip(HEADER_ROWS) {
        let row = build_row(offset + 1, &headers, cells);
        if row.values.values().all(Value::is_null) {
            continue;
        }
        rows.push(row);
    }

    log::info!("Read {} rows from sheet '{}' of {}", rows.len(), sheet, path.display());
    Ok(rows)
}

/// Synthesize the hour-clock column names for a sheet of the given width.
pub fn day_column_headers(total_columns: usize) -> Vec<String> {
    let mut headers: Vec<String> = ["No", "SFNo", "Name"]
        .iter()
        .take(total_columns)
        .map(|s| s.to_string())
        .collect();

    let mut day = 1;
    while headers.len() < total_columns {
        headers.push(format!("P-{}", day));
        if headers.len() < total_columns {
            headers.push(format!("OT-{}", day));
        }
        day += 1;
    }

    headers
}
