//! Errors raised while validating model values.

use thiserror::Error;

/// Errors surfaced while parsing identity values or timestamps.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A pull request identifier was not a positive integer.
    #[error("pull request number must be a positive integer, got {value:?}")]
    InvalidPullRequestId {
        /// The rejected value.
        value: String,
    },

    /// A repository slug did not match `owner/name`.
    #[error("repository must match owner/name, got {value:?}")]
    InvalidRepositorySlug {
        /// The rejected value.
        value: String,
    },

    /// A branch name was empty.
    #[error("branch name must not be empty")]
    EmptyBranchName,

    /// A timestamp did not match the offset-free ISO-8601 format.
    #[error("timestamp must match YYYY-MM-DDTHH:MM:SS, got {value:?}")]
    InvalidTimestamp {
        /// The rejected value.
        value: String,
    },
}
