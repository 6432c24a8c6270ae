//! End-of-run summary

use std::fmt::Write;

use kubedump::export::RunResult;

/// Text printed on stdout once a run finishes.
///
/// Failures are listed unless `quiet`; the total is always printed.
pub fn render_summary(result: &RunResult, quiet: bool) -> String {
    let mut out = String::new();

    if !quiet && !result.failures.is_empty() {
        let _ = writeln!(out, "Skipped {} item(s):", result.failures.len());
        for failure in &result.failures {
            let _ = writeln!(out, "  {}", failure);
        }
    }
    if result.cancelled {
        let _ = writeln!(
            out,
            "Interrupted after {} resource kind(s), output is incomplete",
            result.kinds_processed
        );
    }
    if result.log_files_written > 0 {
        let _ = writeln!(out, "Log files written: {}", result.log_files_written);
    }
    let _ = writeln!(out, "Total files written: {}", result.files_written);
    out
}
