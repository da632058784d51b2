//! Output formatting for batch summaries.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use irlab_core::search::{BatchReport, OutputMode};

/// Formats the report as JSON.
pub fn format_json(report: &BatchReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Formats the report for human-readable terminal output.
pub fn format_human(report: &BatchReport, mode: OutputMode) -> String {
    let kind = match mode {
        OutputMode::Run => "run",
        OutputMode::Verbose => "verbose run",
    };

    if report.outcomes.is_empty() {
        return format!("No {} files written", kind);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Wrote {} {} file{} in {:.1}s:\n\n",
        report.completed,
        kind,
        if report.completed == 1 { "" } else { "s" },
        report.elapsed_ms as f64 / 1000.0
    ));

    for outcome in &report.outcomes {
        output.push_str(&format!("{} [{}]\n", outcome.run_tag, outcome.track));

        let mut details = vec![
            format!("{} queries", outcome.queries),
            format!("{} records", outcome.records),
        ];
        if outcome.fallbacks > 0 {
            details.push(format!("{} fallback", outcome.fallbacks));
        }
        if outcome.skipped > 0 {
            details.push(format!("{} skipped", outcome.skipped));
        }
        output.push_str(&format!("   [{}]\n", details.join(", ")));
        output.push_str(&format!("   Path: {}\n", outcome.path.display()));
    }

    output.trim_end().to_string()
}
