//! Per-run summary counts, rendered at the end of the run.

use std::fmt;

/// Outcome counts for one table in one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSummary {
    pub new: usize,
    pub updated: usize,
    pub rate_logged: usize,
    pub marked_departed: usize,
    pub skipped: usize,
    pub unchanged: usize,
}

/// Accumulated counts for every table touched during the run.
#[derive(Debug, Default)]
pub struct RunSummary {
    entries: Vec<(String, TableSummary)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one table pass into the running totals.
    pub fn record(&mut self, table: &str, summary: TableSummary) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(name, _)| name == table) {
            existing.new += summary.new;
            existing.updated += summary.updated;
            existing.rate_logged += summary.rate_logged;
            existing.marked_departed += summary.marked_departed;
            existing.skipped += summary.skipped;
            existing.unchanged += summary.unchanged;
        } else {
            self.entries.push((table.to_string(), summary));
        }
    }

}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        for (table, s) in &self.entries {
            writeln!(
                f,
                "{}: {} new, {} updated, {} rate-logged, {} marked departed, {} skipped, {} unchanged",
                table, s.new, s.updated, s.rate_logged, s.marked_departed, s.skipped, s.unchanged
            )?;
        }
        write!(f, "-------------------")
    }
}
