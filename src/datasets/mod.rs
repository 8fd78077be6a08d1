//! Persisted dataset files shared between the collection phases and the
//! consistency engine.
//!
//! Three JSON files per repository, all keyed by stringified pull request
//! number, all rooted in one data directory:
//!
//! - `merged_pull_requests_<name>.json` — merged-PR records
//! - `pull_requests_branches_<name>.json` — mined branch membership
//! - `pull_requests_changelog_sections_<name>.json` — changelog placement
//!
//! A missing or malformed file is fatal for the whole run; partial
//! tolerance would corrupt the completeness guarantee the report depends
//! on. Writes replace the whole file with sorted keys and two-space
//! indentation so successive runs diff cleanly.

pub mod error;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{
    BranchMembership, ChangelogSections, MergedPullRequest, PullRequestId, RepositorySlug,
};

pub use error::DatasetError;

/// Loads and saves the per-repository dataset files.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: Utf8PathBuf,
    repository: RepositorySlug,
}

impl DatasetStore {
    /// Creates a store rooted at `dir` for the given repository.
    #[must_use]
    pub const fn new(dir: Utf8PathBuf, repository: RepositorySlug) -> Self {
        Self { dir, repository }
    }

    /// Path of the merged-PR dataset.
    #[must_use]
    pub fn merged_pull_requests_path(&self) -> Utf8PathBuf {
        self.dir
            .join(format!("merged_pull_requests_{}.json", self.repository.name()))
    }

    /// Path of the mined branch-membership dataset.
    #[must_use]
    pub fn branch_membership_path(&self) -> Utf8PathBuf {
        self.dir
            .join(format!("pull_requests_branches_{}.json", self.repository.name()))
    }

    /// Path of the changelog-section dataset.
    #[must_use]
    pub fn changelog_sections_path(&self) -> Utf8PathBuf {
        self.dir.join(format!(
            "pull_requests_changelog_sections_{}.json",
            self.repository.name()
        ))
    }

    /// Loads the merged-PR dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Missing`] when the file is absent and
    /// [`DatasetError::Parse`] when a record is malformed or lacks a
    /// required field.
    pub fn load_merged_pull_requests(
        &self,
    ) -> Result<BTreeMap<PullRequestId, MergedPullRequest>, DatasetError> {
        self.load(&self.merged_pull_requests_path())
    }

    /// Loads the mined branch-membership dataset.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_merged_pull_requests`].
    pub fn load_branch_membership(&self) -> Result<BranchMembership, DatasetError> {
        self.load(&self.branch_membership_path())
    }

    /// Loads the changelog-section dataset.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_merged_pull_requests`].
    pub fn load_changelog_sections(&self) -> Result<ChangelogSections, DatasetError> {
        self.load(&self.changelog_sections_path())
    }

    /// Replaces the branch-membership dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] when the file cannot be written.
    pub fn write_branch_membership(&self, membership: &BranchMembership) -> Result<(), DatasetError> {
        self.write(&self.branch_membership_path(), membership)
    }

    /// Replaces the changelog-section dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] when the file cannot be written.
    pub fn write_changelog_sections(&self, sections: &ChangelogSections) -> Result<(), DatasetError> {
        self.write(&self.changelog_sections_path(), sections)
    }

    fn load<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T, DatasetError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                DatasetError::Missing {
                    path: path.to_owned(),
                }
            } else {
                DatasetError::Io {
                    path: path.to_owned(),
                    message: error.to_string(),
                }
            }
        })?;
        serde_json::from_str(&raw).map_err(|error| DatasetError::Parse {
            path: path.to_owned(),
            message: error.to_string(),
        })
    }

    fn write<T: Serialize>(&self, path: &Utf8Path, value: &T) -> Result<(), DatasetError> {
        let io_error = |error: &dyn std::fmt::Display| DatasetError::Io {
            path: path.to_owned(),
            message: error.to_string(),
        };
        let mut serialised =
            serde_json::to_string_pretty(value).map_err(|error| io_error(&error))?;
        serialised.push('\n');
        fs::write(path, serialised).map_err(|error| io_error(&error))
    }
}
