//! git2-backed implementation of [`BranchLogSource`].
//!
//! Works against an existing clone; fetching and checkout are left to the
//! calling harness. Branch tips are resolved through the `origin` remote
//! first so a freshly fetched clone is read without local checkouts.

use camino::Utf8Path;
use git2::{Oid, Repository, Sort};

use crate::model::BranchName;

use super::BranchLogSource;
use super::error::MiningError;

/// Branch log reader over a local clone.
pub struct GitLogSource {
    repo: Repository,
}

impl std::fmt::Debug for GitLogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLogSource")
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl GitLogSource {
    /// Opens the clone at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::RepositoryNotAvailable`] when the path is not
    /// a Git repository.
    pub fn open(path: &Utf8Path) -> Result<Self, MiningError> {
        let repo = Repository::open(path.as_std_path()).map_err(|error| {
            MiningError::RepositoryNotAvailable {
                message: error.message().to_owned(),
            }
        })?;
        Ok(Self { repo })
    }

    /// Resolves a branch tip, preferring the `origin` remote ref.
    fn branch_tip(&self, branch: &BranchName) -> Result<Oid, MiningError> {
        let remote_ref = format!("refs/remotes/origin/{branch}");
        let local_ref = format!("refs/heads/{branch}");
        let object = self
            .repo
            .revparse_single(&remote_ref)
            .or_else(|_| self.repo.revparse_single(&local_ref))
            .map_err(|error| MiningError::BranchNotFound {
                branch: branch.clone(),
                message: error.message().to_owned(),
            })?;
        let commit = object
            .peel_to_commit()
            .map_err(|error| MiningError::BranchNotFound {
                branch: branch.clone(),
                message: error.message().to_owned(),
            })?;
        Ok(commit.id())
    }

    /// Concatenates commit messages reachable from the branch tip.
    fn collect_log(&self, branch: &BranchName, first_parent: bool) -> Result<String, MiningError> {
        let log_error = |message: String| MiningError::LogUnavailable {
            branch: branch.clone(),
            message,
        };
        let tip = self.branch_tip(branch)?;
        let mut walk = self
            .repo
            .revwalk()
            .map_err(|error| log_error(error.message().to_owned()))?;
        if first_parent {
            walk.simplify_first_parent()
                .map_err(|error| log_error(error.message().to_owned()))?;
        }
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(|error| log_error(error.message().to_owned()))?;
        walk.push(tip)
            .map_err(|error| log_error(error.message().to_owned()))?;

        let mut log = String::new();
        for entry in walk {
            let oid = entry.map_err(|error| log_error(error.message().to_owned()))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|error| log_error(error.message().to_owned()))?;
            if let Some(message) = commit.message() {
                log.push_str(message);
                log.push('\n');
            }
        }
        Ok(log)
    }
}

impl BranchLogSource for GitLogSource {
    fn first_parent_log(&self, branch: &BranchName) -> Result<String, MiningError> {
        self.collect_log(branch, true)
    }

    fn full_log(&self, branch: &BranchName) -> Result<String, MiningError> {
        self.collect_log(branch, false)
    }
}
