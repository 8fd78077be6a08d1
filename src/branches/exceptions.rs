//! Per-repository overrides for pull requests whose branch history cannot
//! be trusted at face value.
//!
//! The tables accumulate over years as branches come and go. Entries that
//! reference a branch no longer tracked by the current [`BranchModel`] are
//! deliberately inert: every query is a lookup, so a stale entry simply
//! never matches.
//!
//! [`BranchModel`]: super::BranchModel

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BranchName, PullRequestId};

/// Static corrections applied on top of the mined branch membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionTables {
    /// Pull requests merged or backported by hand, leaving no detectable
    /// merge marker in the branch log.
    manual_merges: BTreeMap<PullRequestId, BTreeSet<BranchName>>,
    /// Accepted permanently-missing backports on closed branches.
    expected_missing: BTreeMap<PullRequestId, BTreeSet<BranchName>>,
    /// Pull requests present in the mined log but later reverted.
    reverted_from_branch: BTreeMap<PullRequestId, BTreeSet<BranchName>>,
    /// Pull requests whose merge was subsumed by a different pull request.
    closed_by_another: BTreeMap<PullRequestId, PullRequestId>,
}

impl ExceptionTables {
    /// Records a manual merge of `pr` into `branches`.
    #[must_use]
    pub fn with_manual_merge(
        mut self,
        pr: PullRequestId,
        branches: impl IntoIterator<Item = BranchName>,
    ) -> Self {
        self.manual_merges.entry(pr).or_default().extend(branches);
        self
    }

    /// Records branches where the absence of `pr` is permanently accepted.
    #[must_use]
    pub fn with_expected_missing(
        mut self,
        pr: PullRequestId,
        branches: impl IntoIterator<Item = BranchName>,
    ) -> Self {
        self.expected_missing.entry(pr).or_default().extend(branches);
        self
    }

    /// Records branches from which `pr` was reverted after inclusion.
    #[must_use]
    pub fn with_reverted_from(
        mut self,
        pr: PullRequestId,
        branches: impl IntoIterator<Item = BranchName>,
    ) -> Self {
        self.reverted_from_branch
            .entry(pr)
            .or_default()
            .extend(branches);
        self
    }

    /// Records that `pr` was actually merged as part of `by`.
    #[must_use]
    pub fn with_closed_by_another(mut self, pr: PullRequestId, by: PullRequestId) -> Self {
        self.closed_by_another.insert(pr, by);
        self
    }

    /// Whether `pr` was manually merged into `branch`.
    #[must_use]
    pub fn is_manual_merge(&self, pr: PullRequestId, branch: &BranchName) -> bool {
        self.manual_merges
            .get(&pr)
            .is_some_and(|branches| branches.contains(branch))
    }

    /// Whether the absence of `pr` from `branch` is whitelisted.
    #[must_use]
    pub fn is_expected_missing(&self, pr: PullRequestId, branch: &BranchName) -> bool {
        self.expected_missing
            .get(&pr)
            .is_some_and(|branches| branches.contains(branch))
    }

    /// Whether `pr` was reverted from `branch` after inclusion.
    #[must_use]
    pub fn is_reverted_from(&self, pr: PullRequestId, branch: &BranchName) -> bool {
        self.reverted_from_branch
            .get(&pr)
            .is_some_and(|branches| branches.contains(branch))
    }

    /// Pull request that subsumed `pr`, if any. Such pull requests are
    /// excluded from evaluation entirely.
    #[must_use]
    pub fn closed_by(&self, pr: PullRequestId) -> Option<PullRequestId> {
        self.closed_by_another.get(&pr).copied()
    }
}
