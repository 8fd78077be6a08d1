//! Plain-text report renderer.

use std::io::Write;

use crate::consistency::Finding;

use super::{ReportContext, ReportError};

fn io_error(error: &std::io::Error) -> ReportError {
    ReportError::Io {
        message: error.to_string(),
    }
}

/// Writes the console report: surfaced pull requests with their findings,
/// then per-branch backport sections in merge order.
///
/// # Errors
///
/// Returns [`ReportError::Io`] when the writer rejects output.
pub fn write_text<W: Write>(out: &mut W, context: &ReportContext<'_>) -> Result<(), ReportError> {
    writeln!(out, "Main report for repository {}", context.repository).map_err(|e| io_error(&e))?;

    for (id, findings) in context.report.entries(context.show_all) {
        writeln!(
            out,
            "\n#{id} (Milestone: {}) {}",
            context.milestone_label(id),
            context.issue_url(id)
        )
        .map_err(|e| io_error(&e))?;
        for finding in findings {
            write_finding(out, finding).map_err(|e| io_error(&e))?;
        }
    }

    for (branch, queue) in &context.report.backports {
        writeln!(out, "\nBackports to {branch} (in merge order)").map_err(|e| io_error(&e))?;
        for &id in queue {
            let title = context
                .pull_requests
                .get(&id)
                .map_or("(unknown title)", |pr| pr.title.as_str());
            writeln!(out, "# Pull request #{id}: {title}").map_err(|e| io_error(&e))?;
            writeln!(out, "{}", context.backport_command(id)).map_err(|e| io_error(&e))?;
        }
    }

    Ok(())
}

fn write_finding<W: Write>(out: &mut W, finding: &Finding) -> std::io::Result<()> {
    match finding.severity {
        Some(severity) => writeln!(out, "  - [{severity}] {}", finding.message),
        None => writeln!(out, "  - {}", finding.message),
    }
}
