//! Fixture builders shared by unit and integration tests.
//!
//! Compiled only for tests and the `test-support` feature; panics on
//! invalid literals so fixtures stay terse.
#![expect(
    clippy::expect_used,
    reason = "test fixtures accept only valid literals"
)]
#![expect(
    clippy::missing_panics_doc,
    reason = "test fixtures panic on invalid literals by design"
)]

use chrono::NaiveDateTime;

use crate::model::{BranchName, MergedPullRequest, PullRequestId, parse_timestamp};

/// Parses a fixture timestamp such as `2020-01-01T00:00:00`.
#[must_use]
pub fn timestamp(value: &str) -> NaiveDateTime {
    parse_timestamp(value).expect("fixture timestamp should be valid")
}

/// Wraps a fixture pull request number.
#[must_use]
pub fn pull_request_id(number: u64) -> PullRequestId {
    PullRequestId::new(number).expect("fixture pull request number should be positive")
}

/// Wraps a fixture branch name.
#[must_use]
pub fn branch_name(value: &str) -> BranchName {
    BranchName::new(value).expect("fixture branch name should be valid")
}

/// Builder for merged pull request fixtures.
#[derive(Debug, Clone)]
pub struct MergedPullRequestBuilder {
    id: PullRequestId,
    record: MergedPullRequest,
}

impl MergedPullRequestBuilder {
    /// Starts a fixture for the given pull request number, merged at
    /// `2020-01-01T00:00:00` with no milestone and no labels.
    #[must_use]
    pub fn new(number: u64) -> Self {
        let merged_at = timestamp("2020-01-01T00:00:00");
        Self {
            id: pull_request_id(number),
            record: MergedPullRequest {
                title: format!("Example pull request {number}"),
                milestone: None,
                labels: Vec::new(),
                merged_at,
                updated_at: merged_at,
                created_at: merged_at,
                merge_commit: Some(format!("{number:07x}cafe")),
            },
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.record.title = title.to_owned();
        self
    }

    /// Sets the raw milestone label.
    #[must_use]
    pub fn milestone(mut self, milestone: &str) -> Self {
        self.record.milestone = Some(milestone.to_owned());
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.record.labels.push(label.to_owned());
        self
    }

    /// Sets the merge instant.
    #[must_use]
    pub fn merged_at(mut self, value: &str) -> Self {
        self.record.merged_at = timestamp(value);
        self
    }

    /// Sets the merge commit, or clears it for manual merges.
    #[must_use]
    pub fn merge_commit(mut self, value: Option<&str>) -> Self {
        self.record.merge_commit = value.map(str::to_owned);
        self
    }

    /// Finishes the fixture.
    #[must_use]
    pub fn build(self) -> (PullRequestId, MergedPullRequest) {
        (self.id, self.record)
    }
}
