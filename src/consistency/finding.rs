//! Findings attached to pull requests by the consistency engine.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{BranchName, PullRequestId};

/// How actionable a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The observed state is consistent.
    Valid,
    /// Inconsistent, but permanently unfixable (the branch closed before
    /// anyone noticed).
    CantFix,
    /// Inconsistent and actionable.
    Invalid,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::CantFix => "CANTFIX",
            Self::Invalid => "INVALID",
        })
    }
}

/// One observation about a pull request.
///
/// Findings are derived, never persisted; they are recomputed on every
/// evaluation pass. A finding without a severity is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Human-readable description of the observation.
    pub message: String,
    /// Severity, or `None` for purely informational findings.
    pub severity: Option<Severity>,
}

impl Finding {
    /// Creates a finding marking consistent state.
    #[must_use]
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Some(Severity::Valid),
        }
    }

    /// Creates a finding for a permanently unfixable inconsistency.
    #[must_use]
    pub fn cantfix(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Some(Severity::CantFix),
        }
    }

    /// Creates a finding for an actionable inconsistency.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Some(Severity::Invalid),
        }
    }

    /// Creates an informational finding with no severity.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: None,
        }
    }

    /// Whether this finding is actionable.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self.severity, Some(Severity::Invalid))
    }
}

/// Output of one evaluation pass: per-PR findings plus the derived
/// backport worklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Findings per pull request, in the order the cross-checks emitted
    /// them: the changelog check first, then branch checks in cascade
    /// order.
    pub findings: BTreeMap<PullRequestId, Vec<Finding>>,
    /// Pull requests awaiting backport, per branch, in ascending
    /// merge-time order.
    pub backports: BTreeMap<BranchName, Vec<PullRequestId>>,
}

impl EvaluationReport {
    /// Iterates pull requests and their findings.
    ///
    /// By default only pull requests with at least one actionable finding
    /// are yielded; `show_all` disables the filter.
    pub fn entries(
        &self,
        show_all: bool,
    ) -> impl Iterator<Item = (PullRequestId, &[Finding])> {
        self.findings
            .iter()
            .filter(move |(_, findings)| show_all || findings.iter().any(Finding::is_invalid))
            .map(|(&id, findings)| (id, findings.as_slice()))
    }
}
