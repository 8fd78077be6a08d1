//! Top-level error type surfaced by the bosun binary.

use thiserror::Error;

use crate::datasets::DatasetError;
use crate::mining::MiningError;
use crate::model::ModelError;
use crate::report::ReportError;

/// Errors that abort an audit run.
///
/// Every variant is fatal: bosun either completes a full pass or exits
/// non-zero having written nothing, apart from the miner's guaranteed
/// flush of whatever membership it collected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// No branch model or exception tables are registered for the
    /// repository.
    #[error("no branch model registered for repository {repository}")]
    UnknownRepository {
        /// The unregistered repository slug.
        repository: String,
    },

    /// A model value failed validation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A dataset file is missing or malformed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Branch mining failed.
    #[error(transparent)]
    Mining(#[from] MiningError),

    /// Report rendering failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A local I/O operation outside the dataset store failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying operation.
        message: String,
    },
}
