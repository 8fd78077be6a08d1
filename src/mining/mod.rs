//! Branch membership mining.
//!
//! For every merged pull request, the miner determines which maintenance
//! branches contain it by scanning two log views per branch: the
//! first-parent log, where only direct merge commits are visible, for the
//! `Merge pull request #<n> ` marker; and the full log, as a fallback, for
//! the structured `Backport PR #<n>:` marker left by scripted backports.
//!
//! Checkout and fetch belong to the calling harness; the miner only
//! consumes log text through [`BranchLogSource`]. Each branch is scanned
//! independently, so the result is identical regardless of branch order.
//! Concurrent runs against one clone share a checkout directory and must
//! be serialised by the caller.

pub mod error;
pub mod git;

use tracing::warn;

use crate::datasets::DatasetStore;
use crate::model::{BranchMembership, BranchName, PullRequestId};

pub use error::MiningError;
pub use git::GitLogSource;

/// Supplies the two log views for a maintenance branch.
#[cfg_attr(test, mockall::automock)]
pub trait BranchLogSource {
    /// Concatenated messages of the branch's first-parent history.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError`] when the branch tip cannot be resolved or
    /// its history cannot be walked.
    fn first_parent_log(&self, branch: &BranchName) -> Result<String, MiningError>;

    /// Concatenated messages of the branch's full history.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError`] when the branch tip cannot be resolved or
    /// its history cannot be walked.
    fn full_log(&self, branch: &BranchName) -> Result<String, MiningError>;
}

/// A merge marker that appeared more than once in one branch's log.
///
/// Duplicates can indicate a corrupted history or a re-applied merge; they
/// are surfaced for human review, never escalated to a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMarker {
    /// Pull request whose marker repeated.
    pub pull_request: PullRequestId,
    /// Branch whose log contains the repeats.
    pub branch: BranchName,
    /// How many times the marker appeared.
    pub occurrences: usize,
}

/// Result of one mining pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiningOutcome {
    /// Pull request to branch-set mapping.
    pub membership: BranchMembership,
    /// Duplicate-marker warnings gathered along the way.
    pub warnings: Vec<DuplicateMarker>,
}

/// Scans branch logs for merge and backport markers.
#[derive(Debug)]
pub struct MembershipMiner<'a, S: BranchLogSource> {
    source: &'a S,
}

impl<'a, S: BranchLogSource> MembershipMiner<'a, S> {
    /// Creates a miner over the given log source.
    #[must_use]
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Mines membership for every pull request across every branch.
    ///
    /// # Errors
    ///
    /// Returns the first [`MiningError`] raised by the log source.
    pub fn mine(
        &self,
        branches: &[BranchName],
        pull_requests: &[PullRequestId],
    ) -> Result<MiningOutcome, MiningError> {
        let mut outcome = MiningOutcome::default();
        self.mine_into(branches, pull_requests, &mut outcome)?;
        Ok(outcome)
    }

    /// Mines membership and always flushes whatever was collected, even
    /// when a branch fails midway.
    ///
    /// The flush is the miner's only side effect and follows last-writer-
    /// wins semantics: a crash during mining still persists the branches
    /// scanned so far.
    ///
    /// # Errors
    ///
    /// Returns the mining error if one occurred, otherwise any persistence
    /// error from the flush.
    pub fn mine_and_persist(
        &self,
        branches: &[BranchName],
        pull_requests: &[PullRequestId],
        store: &DatasetStore,
    ) -> Result<MiningOutcome, MiningError> {
        let mut outcome = MiningOutcome::default();
        let mined = self.mine_into(branches, pull_requests, &mut outcome);
        let flushed = store.write_branch_membership(&outcome.membership);
        mined?;
        flushed?;
        Ok(outcome)
    }

    fn mine_into(
        &self,
        branches: &[BranchName],
        pull_requests: &[PullRequestId],
        outcome: &mut MiningOutcome,
    ) -> Result<(), MiningError> {
        for branch in branches {
            self.scan_branch(branch, pull_requests, outcome)?;
        }
        Ok(())
    }

    fn scan_branch(
        &self,
        branch: &BranchName,
        pull_requests: &[PullRequestId],
        outcome: &mut MiningOutcome,
    ) -> Result<(), MiningError> {
        let first_parent = self.source.first_parent_log(branch)?;
        let full = self.source.full_log(branch)?;

        for &pr in pull_requests {
            let merge_marker = format!("Merge pull request #{pr} ");
            let mut occurrences = first_parent.matches(&merge_marker).count();
            if occurrences == 0 {
                let backport_marker = format!("Backport PR #{pr}:");
                occurrences = full.matches(&backport_marker).count();
            }
            if occurrences == 0 {
                continue;
            }
            outcome
                .membership
                .entry(pr)
                .or_default()
                .insert(branch.clone());
            if occurrences > 1 {
                warn!(
                    pull_request = %pr,
                    branch = %branch,
                    occurrences,
                    "merge marker appears more than once"
                );
                outcome.warnings.push(DuplicateMarker {
                    pull_request: pr,
                    branch: branch.clone(),
                    occurrences,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
