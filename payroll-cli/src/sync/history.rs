//! Append-only change-history text embedded on mutable records.

use chrono::NaiveDate;

/// A single auditable event on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// The record was created by this run
    Inserted,
    /// One field was updated to a new value
    Updated { field: String, value: String },
}

/// Render one history line: `{current-date} {period}: {action}`.
pub fn history_line(today: NaiveDate, period: &str, event: &HistoryEvent) -> String {
    let prefix = format!("{} {}: ", today.format("%d-%m-%Y"), period);
    match event {
        HistoryEvent::Inserted => format!("{}Inserted New Record", prefix),
        HistoryEvent::Updated { field, value } => {
            format!("{}Updated {} to {}", prefix, field, value)
        }
    }
}

/// Prepend freshly composed lines (newest first) to whatever history text
/// already existed, separated by a newline.
pub fn prepend_history(new_lines: &[String], existing: &str) -> String {
    let fresh = new_lines.join("\n");
    if existing.trim().is_empty() {
        fresh
    } else {
        format!("{}\n{}", fresh, existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_inserted_line_format() {
        assert_eq!(
            history_line(today(), "Mar-24", &HistoryEvent::Inserted),
            "02-04-2024 Mar-24: Inserted New Record"
        );
    }

    #[test]
    fn test_updated_line_format() {
        let event = HistoryEvent::Updated {
            field: "DOJ".to_string(),
            value: "2024-03-01".to_string(),
        };
        assert_eq!(
            history_line(today(), "Mar-24", &event),
            "02-04-2024 Mar-24: Updated DOJ to 2024-03-01"
        );
    }

    #[test]
    fn test_prepend_to_empty_history() {
        let lines = vec!["line one".to_string()];
        assert_eq!(prepend_history(&lines, ""), "line one");
        assert_eq!(prepend_history(&lines, "   "), "line one");
    }

    #[test]
    fn test_prepend_newest_first() {
        let lines = vec!["newer a".to_string(), "newer b".to_string()];
        assert_eq!(
            prepend_history(&lines, "older"),
            "newer a\nnewer b\nolder"
        );
    }
}
