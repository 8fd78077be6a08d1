//! Errors raised while loading or saving dataset files.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failure while reading or writing a persisted dataset.
///
/// All three variants are fatal for the run that hit them: the engine
/// never evaluates against a partial dataset.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("dataset file is missing: {path}")]
    Missing {
        /// Path that was expected to exist.
        path: Utf8PathBuf,
    },

    /// The dataset file could not be read or written.
    #[error("I/O error on dataset {path}: {message}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Error detail from the underlying operation.
        message: String,
    },

    /// The dataset file exists but a record is malformed.
    #[error("malformed dataset {path}: {message}")]
    Parse {
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Parser error naming the offending record or field.
        message: String,
    },
}
