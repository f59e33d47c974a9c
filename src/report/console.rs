//! Console summary printer.

use std::fmt::Write as _;

use crate::DailySummary;

// ---

/// Printed when there is nothing to summarize.
pub const NO_DATA: &str = "No data available.";

/// Render summaries as the console report.
///
/// Each day gets five lines followed by a 40-dash separator. An empty slice
/// renders as [`NO_DATA`].
pub fn format_summaries(summaries: &[DailySummary]) -> String {
    // ---
    if summaries.is_empty() {
        return format!("{NO_DATA}\n");
    }

    let mut out = String::new();
    for s in summaries {
        // Writing to a String cannot fail
        let _ = writeln!(out, "Date: {}", s.date.format("%Y-%m-%d"));
        let _ = writeln!(out, "Average Temperature: {:.2} °C", s.avg_temp);
        let _ = writeln!(out, "Maximum Temperature: {:.2} °C", s.max_temp);
        let _ = writeln!(out, "Minimum Temperature: {:.2} °C", s.min_temp);
        let _ = writeln!(out, "Dominant Weather Condition: {}", s.dominant_condition);
        let _ = writeln!(out, "{}", "-".repeat(40));
    }
    out
}

/// Print summaries to stdout.
pub fn print_summaries(summaries: &[DailySummary]) {
    print!("{}", format_summaries(summaries));
}
