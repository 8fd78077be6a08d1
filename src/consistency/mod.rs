//! The consistency engine: cross-checks merged pull requests against
//! changelog placement, milestones, labels, and mined branch membership.
//!
//! [`evaluate`] is a pure function of its inputs. It walks pull requests in
//! ascending merge order (ties broken by number), emits findings per pull
//! request, and derives the backport worklist as a side product. Nothing is
//! persisted; findings are recomputed on every run.

pub mod finding;

use chrono::NaiveDateTime;

use crate::branches::{BranchModel, BranchWindow, ExceptionTables};
use crate::model::{
    BranchMembership, ChangelogSections, MergedPullRequest, PullRequestId,
};

pub use finding::{EvaluationReport, Finding, Severity};

use std::collections::BTreeMap;

/// Everything one evaluation pass reads. All borrowed; the engine never
/// mutates its inputs.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInputs<'a> {
    /// Merged pull requests keyed by number.
    pub pull_requests: &'a BTreeMap<PullRequestId, MergedPullRequest>,
    /// Mined branch membership.
    pub membership: &'a BranchMembership,
    /// Changelog section per pull request.
    pub changelog: &'a ChangelogSections,
    /// Branch lifecycle for the repository.
    pub model: &'a BranchModel,
    /// Static overrides for untrustworthy history.
    pub exceptions: &'a ExceptionTables,
    /// Pull requests merged before this instant are out of scope.
    pub start_cutoff: NaiveDateTime,
}

/// Evaluates every in-scope pull request and derives the backport worklist.
#[must_use]
pub fn evaluate(inputs: &EvaluationInputs<'_>) -> EvaluationReport {
    let mut report = EvaluationReport::default();

    let mut ordered: Vec<(PullRequestId, &MergedPullRequest)> = inputs
        .pull_requests
        .iter()
        .map(|(&id, pr)| (id, pr))
        .collect();
    ordered.sort_by(|a, b| (a.1.merged_at, a.0).cmp(&(b.1.merged_at, b.0)));

    for (id, pr) in ordered {
        if pr.merged_at < inputs.start_cutoff
            || pr.unusual_merge_dealt_with()
            || inputs.exceptions.closed_by(id).is_some()
        {
            continue;
        }

        let milestone = pr.normalized_milestone();
        let section = inputs
            .changelog
            .get(&id)
            .map(|version| strip_release_candidate(version));

        let mut findings = Vec::new();
        findings.extend(changelog_finding(pr, milestone.as_deref(), section));
        if let Some(milestone) = milestone.as_deref() {
            append_branch_findings(inputs, id, pr, milestone, &mut findings, &mut report);
        }
        report.findings.insert(id, findings);
    }

    report
}

/// Drops the temporary release-candidate suffix from a changelog version,
/// so a pull request listed under `v4.1rc2` compares as `v4.1`.
fn strip_release_candidate(version: &str) -> &str {
    version.split("rc").next().unwrap_or(version)
}

/// The changelog/milestone/label cross-check. Returns at most one finding;
/// a changelog entry on an affects-dev pull request is tolerated silently.
fn changelog_finding(
    pr: &MergedPullRequest,
    milestone: Option<&str>,
    section: Option<&str>,
) -> Option<Finding> {
    if let Some(section) = section {
        if pr.affects_dev() {
            return None;
        }
        if pr.no_changelog_entry_needed() {
            return Some(Finding::invalid(
                "Labelled as no-changelog-entry-needed but in changelog",
            ));
        }
        return Some(match milestone {
            None => Finding::info(format!("In changelog ({section}) but not milestoned")),
            Some(milestone) if milestone.starts_with(section) => {
                Finding::valid(format!("In correct section of changelog ({section})"))
            }
            Some(milestone) => Finding::invalid(format!(
                "Milestone is {milestone} but change log section is {section}"
            )),
        });
    }

    if pr.affects_dev() {
        return Some(Finding::valid("Labelled as affects-dev and not in changelog"));
    }
    if pr.no_changelog_entry_needed() {
        return Some(Finding::valid(
            "Labelled as no-changelog-entry-needed and not in changelog",
        ));
    }
    Some(match milestone {
        None => Finding::invalid("Not in changelog (and no milestone) but not labelled affects-dev"),
        // The earliest pre-1.0 milestones predate the changelog discipline.
        Some(milestone) if milestone.starts_with("v0.1") => {
            Finding::valid(format!("Not in changelog (but ok since milestoned as {milestone})"))
        }
        Some(milestone) => Finding::invalid(format!(
            "Not in changelog (milestoned as {milestone}) but not labelled as affects-dev"
        )),
    })
}

/// The branch-membership cross-check: before the milestone's branch the
/// pull request must be absent, from there on it must be present or
/// excused. Appends one finding per branch that warrants one and records
/// actionable absences in the backport worklist.
fn append_branch_findings(
    inputs: &EvaluationInputs<'_>,
    id: PullRequestId,
    pr: &MergedPullRequest,
    milestone: &str,
    findings: &mut Vec<Finding>,
    report: &mut EvaluationReport,
) {
    // Without a branch for this milestone yet there is nothing to check.
    let Some(index) = inputs.model.milestone_branch_index(milestone) else {
        return;
    };

    for (position, window) in inputs.model.windows().iter().enumerate() {
        let present = inputs
            .membership
            .get(&id)
            .is_some_and(|branches| branches.contains(&window.name));

        if position < index {
            if !present {
                continue;
            }
            findings.push(early_presence_finding(inputs.exceptions, id, window));
        } else if present {
            findings.push(Finding::valid(format!(
                "Pull request was included in branch {}",
                window.name
            )));
        } else {
            let (finding, needs_backport) = absence_finding(inputs.exceptions, id, pr, window);
            if needs_backport {
                report
                    .backports
                    .entry(window.name.clone())
                    .or_default()
                    .push(id);
            }
            findings.push(finding);
        }
    }
}

/// Presence in a branch older than the milestone's: an error unless the
/// pull request is known to have been reverted there.
fn early_presence_finding(
    exceptions: &ExceptionTables,
    id: PullRequestId,
    window: &BranchWindow,
) -> Finding {
    if exceptions.is_reverted_from(id, &window.name) {
        Finding::valid(format!(
            "Pull request was in branch {} but has been reverted later",
            window.name
        ))
    } else {
        Finding::invalid(format!(
            "Pull request was included in branch {}",
            window.name
        ))
    }
}

/// Absence from a branch at or after the milestone's: excused by the
/// exception tables or the branch lifecycle, otherwise actionable.
fn absence_finding(
    exceptions: &ExceptionTables,
    id: PullRequestId,
    pr: &MergedPullRequest,
    window: &BranchWindow,
) -> (Finding, bool) {
    if exceptions.is_manual_merge(id, &window.name) {
        return (
            Finding::valid(format!(
                "Pull request was included in branch {} (manually merged)",
                window.name
            )),
            false,
        );
    }
    if exceptions.is_expected_missing(id, &window.name) {
        return (
            Finding::valid(format!(
                "Pull request was not included in branch {} (but whitelisted as ok)",
                window.name
            )),
            false,
        );
    }
    if let Some(closed_at) = window.closed_at {
        if pr.merged_at > closed_at {
            (
                Finding::valid(format!(
                    "Pull request was not included in branch {} (but was merged after branch closed)",
                    window.name
                )),
                false,
            )
        } else {
            (
                Finding::cantfix(format!(
                    "Pull request was not included in branch {} (but too late to fix)",
                    window.name
                )),
                false,
            )
        }
    } else {
        (
            Finding::invalid(format!(
                "Pull request was not included in branch {}. Backport command included below.",
                window.name
            )),
            true,
        )
    }
}

#[cfg(test)]
mod tests;
