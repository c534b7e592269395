//! Output Formatting
//!
//! Human-readable output formatting for run reports: one row per testcase
//! with status, timing, CPU ticks, peak memory, and the first line of any
//! fault, followed by a summary.

use casebench_report::Report;

/// Format a report for human-readable terminal display
///
/// # Arguments
/// * `report` - Complete run report
/// * `entry_point` - Name of the entry point that was run
///
/// # Returns
/// Formatted string suitable for terminal output
pub fn format_human_output(report: &Report, entry_point: &str) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("Casebench Results: {}\n", entry_point));
    output.push_str(&"=".repeat(72));
    output.push_str("\n\n");

    let key_width = report
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or(8)
        .max("Testcase".len());

    output.push_str(&format!(
        "  {:<width$}  {:<6}  {:>12}  {:>6}  {:>6}  {:>10}\n",
        "Testcase",
        "Status",
        "Realtime (s)",
        "utime",
        "stime",
        "Memory kB",
        width = key_width
    ));
    output.push_str(&format!("  {}\n", "-".repeat(key_width + 52)));

    for (key, entry) in report.iter() {
        let status = if entry.is_fault() { "FAULT" } else { "ok" };
        output.push_str(&format!(
            "  {:<width$}  {:<6}  {:>12}  {:>6}  {:>6}  {:>10}\n",
            key,
            status,
            entry.realtime.to_string(),
            entry.utime,
            entry.stime,
            entry.max_memory,
            width = key_width
        ));

        if let Some(first_line) = entry.stderr.as_deref().and_then(|s| s.lines().next()) {
            output.push_str(&format!("      error: {}\n", first_line));
        }
    }

    let summary = report.summary();
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Succeeded: {}  Faulted: {}\n",
        summary.total, summary.succeeded, summary.faulted
    ));
    output.push_str(&format!(
        "  Realtime: {:.6} s\n",
        summary.total_realtime
    ));

    output
}
