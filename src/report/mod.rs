//! Report rendering over the consistency engine's output.
//!
//! Two presentations of the same content: a plain-text console report and
//! an HTML page rendered through a `minijinja` template. Both list every
//! surfaced pull request with its findings, followed by per-branch
//! backport sections containing ready-to-run cherry-pick commands in merge
//! order.

pub mod html;
pub mod text;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::consistency::EvaluationReport;
use crate::model::{MergedPullRequest, PullRequestId, RepositorySlug};

pub use html::render_html;
pub use text::write_text;

/// Failure while rendering or writing a report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The report template failed to render.
    #[error("report template error: {message}")]
    Template {
        /// Error detail from the template engine.
        message: String,
    },

    /// The rendered report could not be written out.
    #[error("report output error: {message}")]
    Io {
        /// Error detail from the underlying writer.
        message: String,
    },
}

/// Which presentation to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Plain-text console report.
    Text,
    /// Self-contained HTML page.
    Html,
}

/// Everything a renderer needs for one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Repository the report covers; also used to build issue URLs.
    pub repository: &'a RepositorySlug,
    /// Merged pull requests, for titles, milestones, and merge commits.
    pub pull_requests: &'a BTreeMap<PullRequestId, MergedPullRequest>,
    /// Engine output being presented.
    pub report: &'a EvaluationReport,
    /// Whether to include pull requests without actionable findings.
    pub show_all: bool,
}

impl ReportContext<'_> {
    /// GitHub issue URL for a pull request.
    #[must_use]
    pub fn issue_url(&self, id: PullRequestId) -> String {
        format!("https://github.com/{}/issues/{id}", self.repository)
    }

    /// Milestone shown for a pull request, `none` when unset.
    #[must_use]
    pub fn milestone_label(&self, id: PullRequestId) -> String {
        self.pull_requests
            .get(&id)
            .and_then(MergedPullRequest::normalized_milestone)
            .unwrap_or_else(|| "none".to_owned())
    }

    /// The backport command for a pull request, or a manual-action note
    /// when no merge commit was recorded.
    #[must_use]
    pub fn backport_command(&self, id: PullRequestId) -> String {
        self.pull_requests
            .get(&id)
            .and_then(|pr| pr.merge_commit.as_deref())
            .map_or_else(
                || "# no merge commit recorded; backport manually".to_owned(),
                |commit| format!("git cherry-pick -m 1 {commit}"),
            )
    }
}

/// Renders the report in the requested format.
///
/// # Errors
///
/// Returns [`ReportError`] when the template fails or the writer rejects
/// output.
pub fn render<W: std::io::Write>(
    out: &mut W,
    format: ReportFormat,
    context: &ReportContext<'_>,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Text => write_text(out, context),
        ReportFormat::Html => {
            let page = render_html(context)?;
            out.write_all(page.as_bytes())
                .map_err(|error| ReportError::Io {
                    message: error.to_string(),
                })
        }
    }
}
