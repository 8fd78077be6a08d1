//! Application configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.bosun.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `BOSUN_REPOSITORY`, `BOSUN_DATA_DIR`, ...
//! 4. **Command-line arguments** – `--repository`/`-R` and friends
//!
//! # Configuration File
//!
//! Place `.bosun.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! repository = "astropy/astropy"
//! data_dir = "."
//! show_all = false
//! html = true
//! ```

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::model::{RepositorySlug, parse_timestamp};

/// Repository audited when none is configured.
pub const DEFAULT_REPOSITORY: &str = "astropy/astropy";

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Evaluate the three datasets and report findings (default).
    CheckConsistency,
    /// Mine branch membership from a local clone.
    MineBranches,
    /// Resolve changelog sections from a changelog file.
    ResolveChangelog,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `BOSUN_REPOSITORY` or `--repository`: Repository slug (`owner/name`)
/// - `BOSUN_DATA_DIR` or `--data-dir`: Directory holding the dataset files
/// - `BOSUN_START` or `--start`: Audit window override (offset-free
///   ISO-8601)
/// - `BOSUN_CLONE_PATH` or `--clone-path`: Local clone for branch mining
/// - `BOSUN_CHANGELOG_PATH` or `--changelog-path`: Changelog file to
///   resolve
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BOSUN",
    discovery(
        dotfile_name = ".bosun.toml",
        config_file_name = "bosun.toml",
        app_name = "bosun"
    )
)]
pub struct BosunConfig {
    /// Repository to audit, `owner/name`.
    ///
    /// Can be provided via:
    /// - CLI: `--repository <SLUG>` or `-R <SLUG>`
    /// - Environment: `BOSUN_REPOSITORY`
    /// - Config file: `repository = "..."`
    #[ortho_config(cli_short = 'R')]
    pub repository: Option<String>,

    /// Directory holding the three dataset files. Defaults to the current
    /// directory.
    #[ortho_config(cli_short = 'd')]
    pub data_dir: Option<String>,

    /// Shows pull requests without actionable findings as well.
    ///
    /// Can be provided via:
    /// - CLI: `--show-all` or `-a`
    /// - Config file: `show_all = true`
    #[ortho_config(cli_short = 'a')]
    pub show_all: bool,

    /// Renders the report as HTML instead of plain text.
    pub html: bool,

    /// Overrides the repository's audit window opening, offset-free
    /// ISO-8601 (`2015-01-27T16:22:59`). Pull requests merged before this
    /// instant are out of scope.
    pub start: Option<String>,

    /// Mines branch membership from a local clone and exits.
    ///
    /// Requires `clone_path`. The mined membership replaces the
    /// branch-membership dataset, flushing partial results even on
    /// failure.
    pub mine: bool,

    /// Path of the local clone used for branch mining.
    pub clone_path: Option<String>,

    /// Resolves changelog sections from `changelog_path` and exits.
    pub resolve_changelog: bool,

    /// Path of the changelog file to resolve.
    pub changelog_path: Option<String>,
}

impl BosunConfig {
    /// Determines the operation mode based on provided configuration.
    ///
    /// Mining wins over changelog resolution when both flags are set;
    /// without either flag bosun runs the consistency check.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.mine {
            OperationMode::MineBranches
        } else if self.resolve_changelog {
            OperationMode::ResolveChangelog
        } else {
            OperationMode::CheckConsistency
        }
    }

    /// Returns the configured repository, falling back to
    /// [`DEFAULT_REPOSITORY`].
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Model`] when the slug is not `owner/name`.
    pub fn repository(&self) -> Result<RepositorySlug, AuditError> {
        let raw = self.repository.as_deref().unwrap_or(DEFAULT_REPOSITORY);
        Ok(RepositorySlug::parse(raw)?)
    }

    /// Directory holding the dataset files.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(|| Utf8PathBuf::from("."), Utf8PathBuf::from)
    }

    /// Parses the audit window override, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Model`] when the value is not an offset-free
    /// ISO-8601 timestamp.
    pub fn start_cutoff_override(&self) -> Result<Option<NaiveDateTime>, AuditError> {
        self.start
            .as_deref()
            .map(|value| parse_timestamp(value).map_err(AuditError::from))
            .transpose()
    }

    /// Returns the clone path required by mining mode.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when no clone path is
    /// configured.
    pub fn require_clone_path(&self) -> Result<Utf8PathBuf, AuditError> {
        self.clone_path
            .as_deref()
            .map(Utf8PathBuf::from)
            .ok_or_else(|| AuditError::Configuration {
                message: "clone path is required for mining (use --clone-path)".to_owned(),
            })
    }

    /// Returns the changelog path required by resolution mode.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when no changelog path is
    /// configured.
    pub fn require_changelog_path(&self) -> Result<Utf8PathBuf, AuditError> {
        self.changelog_path
            .as_deref()
            .map(Utf8PathBuf::from)
            .ok_or_else(|| AuditError::Configuration {
                message: "changelog path is required for resolution (use --changelog-path)"
                    .to_owned(),
            })
    }
}
