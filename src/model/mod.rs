//! Core data model shared by every bosun subsystem.
//!
//! The model keeps identity types strongly typed at the boundaries: pull
//! request numbers arrive as stringified integers in the persisted datasets
//! and are converted to [`PullRequestId`] exactly once, so the rest of the
//! crate never mixes string and integer keys.

pub mod error;
pub mod identity;
pub mod pull_request;

use std::collections::{BTreeMap, BTreeSet};

pub use error::ModelError;
pub use identity::{BranchName, PullRequestId, RepositorySlug};
pub use pull_request::{MergedPullRequest, normalize_milestone};

/// Mapping from pull request to the maintenance branches that contain it.
///
/// Produced by the branch membership miner and treated as ground truth,
/// subject to the exception tables' corrections.
pub type BranchMembership = BTreeMap<PullRequestId, BTreeSet<BranchName>>;

/// Mapping from pull request to the changelog section version it appears in.
pub type ChangelogSections = BTreeMap<PullRequestId, String>;

/// Format of the offset-free ISO-8601 timestamps carried by the datasets.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses an offset-free ISO-8601 timestamp such as `2015-01-27T16:22:59`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidTimestamp`] when the value does not match
/// [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(value: &str) -> Result<chrono::NaiveDateTime, ModelError> {
    chrono::NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        ModelError::InvalidTimestamp {
            value: value.to_owned(),
        }
    })
}
