//! Ordered branch list with closure dates and the audit window opening.

use chrono::NaiveDateTime;

use crate::model::BranchName;

/// One maintenance branch and the instant it stopped accepting backports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchWindow {
    /// Branch name, e.g. `v4.1.x`.
    pub name: BranchName,
    /// Closure instant; `None` while the branch still accepts backports.
    pub closed_at: Option<NaiveDateTime>,
}

impl BranchWindow {
    /// Creates a branch window.
    #[must_use]
    pub const fn new(name: BranchName, closed_at: Option<NaiveDateTime>) -> Self {
        Self { name, closed_at }
    }

    /// Whether the branch still accepts backports.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// Static branch knowledge for one repository: branches ordered oldest
/// first, plus the cutoff before which merged pull requests are out of
/// scope for auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchModel {
    windows: Vec<BranchWindow>,
    start_cutoff: NaiveDateTime,
}

impl BranchModel {
    /// Creates a branch model from branches ordered oldest first.
    #[must_use]
    pub const fn new(windows: Vec<BranchWindow>, start_cutoff: NaiveDateTime) -> Self {
        Self {
            windows,
            start_cutoff,
        }
    }

    /// Borrow the ordered branch windows, oldest first.
    #[must_use]
    pub fn windows(&self) -> &[BranchWindow] {
        &self.windows
    }

    /// Branch names in cascade order.
    pub fn names(&self) -> impl Iterator<Item = &BranchName> {
        self.windows.iter().map(|window| &window.name)
    }

    /// Position of a branch in the cascade, if tracked.
    #[must_use]
    pub fn index_of(&self, name: &BranchName) -> Option<usize> {
        self.windows.iter().position(|window| &window.name == name)
    }

    /// Whether the branch is tracked by this model.
    #[must_use]
    pub fn contains(&self, name: &BranchName) -> bool {
        self.index_of(name).is_some()
    }

    /// Cascade index a milestone maps to, if its derived branch is tracked.
    #[must_use]
    pub fn milestone_branch_index(&self, milestone: &str) -> Option<usize> {
        earliest_expected_branch(milestone).and_then(|name| self.index_of(&name))
    }

    /// Instant before which merged pull requests are out of audit scope.
    #[must_use]
    pub const fn start_cutoff(&self) -> NaiveDateTime {
        self.start_cutoff
    }
}

/// Derives the earliest branch a milestone is expected in: the first four
/// characters of the normalised milestone followed by `.x`, so `v4.1` and
/// `v4.1.1` both map to `v4.1.x`.
#[must_use]
pub fn earliest_expected_branch(milestone: &str) -> Option<BranchName> {
    let stem: String = milestone.chars().take(4).collect();
    BranchName::new(format!("{stem}.x")).ok()
}
