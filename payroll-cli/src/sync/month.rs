//! Reporting-period token extraction from workbook filenames.
//!
//! Every workbook carries a date in its filename ("EmpClockingFormat -
//! 12-5-2025.xlsx"); the month-year token derived from it partitions all
//! period-scoped records and makes reprocessing idempotent.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// First date-shaped substring: three 1-4 digit components, two separators.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,4}-\d{1,4}-\d{1,4}").unwrap());

/// Interpretations tried in fixed order; the first that parses wins.
///
/// Day-first bias on ambiguous inputs ("05-03-2024" reads as 5 March) is
/// deliberate and documented — the filenames this tool consumes are written
/// day-first, and there is no reliable way to disambiguate after the fact.
const FORMATS: [&str; 3] = ["%d-%m-%Y", "%m-%d-%Y", "%Y-%m-%d"];

/// Extract the reporting-period token (`%b-%y`, e.g. "May-25") from a
/// filename.
///
/// Returns `None` when no date-shaped substring is found or none of the
/// interpretations parse; the caller logs a warning and skips the file.
pub fn month_token(filename: &str) -> Option<String> {
    let candidate = DATE_PATTERN.find(filename)?.as_str();

    let date = parse_candidate(candidate);
    if date.is_none() {
        log::warn!("Could not parse a date out of '{}' in filename '{}'", candidate, filename);
    }

    date.map(|d| d.format("%b-%y").to_string())
}

fn parse_candidate(candidate: &str) -> Option<NaiveDate> {
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}
