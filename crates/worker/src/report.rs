//! Human-readable rendering of overdue job reports.

use std::fmt::Write;

use todolist_core::overdue::{CloseOutcome, CloseReport};

fn outcome_label(outcome: &CloseOutcome) -> String {
    match outcome {
        CloseOutcome::WouldClose => "would close".to_string(),
        CloseOutcome::Closed { closed_at } => {
            format!("closed at {}", closed_at.format("%Y-%m-%d %H:%M:%S UTC"))
        }
        CloseOutcome::Skipped { reason } => format!("skipped: {reason}"),
        CloseOutcome::Failed { reason } => format!("failed: {reason}"),
    }
}

/// Render a report as a fixed-width table followed by a summary line.
pub fn render(report: &CloseReport) -> String {
    let mut out = String::new();
    let mode = if report.dry_run { "dry run" } else { "run" };

    if report.is_empty() {
        let _ = writeln!(out, "No overdue tasks as of {} ({mode}).", report.as_of);
        return out;
    }

    let name_width = report
        .entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let _ = writeln!(
        out,
        "{:>8}  {:>8}  {:<name_width$}  {:<10}  OUTCOME",
        "TASK", "PROJECT", "NAME", "DEADLINE"
    );
    for entry in &report.entries {
        let deadline = entry
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>8}  {:>8}  {:<name_width$}  {:<10}  {}",
            entry.task_id,
            entry.project_id,
            entry.name,
            deadline,
            outcome_label(&entry.outcome)
        );
    }

    if report.dry_run {
        let _ = writeln!(
            out,
            "{} overdue task(s) as of {} ({mode}).",
            report.entries.len(),
            report.as_of
        );
    } else {
        let _ = writeln!(
            out,
            "{} closed, {} skipped, {} failed as of {} ({mode}).",
            report.closed_count(),
            report.skipped_count(),
            report.failed_count(),
            report.as_of
        );
    }
    out
}
