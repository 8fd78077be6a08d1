//! Errors raised while mining branch logs.

use thiserror::Error;

use crate::datasets::DatasetError;
use crate::model::BranchName;

/// Failure while reading branch history or persisting the mined result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MiningError {
    /// The repository clone could not be opened.
    #[error("repository is not available: {message}")]
    RepositoryNotAvailable {
        /// Error detail from the version-control layer.
        message: String,
    },

    /// The branch has no resolvable tip in the clone.
    #[error("branch {branch} was not found: {message}")]
    BranchNotFound {
        /// Branch that could not be resolved.
        branch: BranchName,
        /// Error detail from the version-control layer.
        message: String,
    },

    /// The branch log could not be walked.
    #[error("log for branch {branch} is unavailable: {message}")]
    LogUnavailable {
        /// Branch whose log failed.
        branch: BranchName,
        /// Error detail from the version-control layer.
        message: String,
    },

    /// The mined membership could not be flushed to disk.
    #[error(transparent)]
    Persistence(#[from] DatasetError),
}
