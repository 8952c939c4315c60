//! Thin workbook adapter: named-field rows from a sheet, given a file path
//! and sheet name.

pub mod hourclock;
pub mod reader;

pub use hourclock::read_hour_clock;
pub use reader::read_table;

use std::path::Path;

use anyhow::Result;

use crate::sync::{SheetLayout, SourceRow};

/// Read a sheet with the layout its table spec declares.
pub fn read_sheet(path: &Path, sheet: &str, layout: SheetLayout) -> Result<Vec<SourceRow>> {
    match layout {
        SheetLayout::SingleHeader => read_table(path, sheet),
        SheetLayout::HourClock => read_hour_clock(path, sheet),
    }
}
