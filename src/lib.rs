//! Bosun library crate auditing pull request metadata across maintenance
//! branches.
//!
//! The library reconciles three datasets for a repository: merged pull
//! request metadata, per-branch membership mined from git history, and
//! changelog section assignments. It evaluates them against a registered
//! branch model, producing per-pull-request findings and a backport
//! worklist that the CLI renders as text or HTML.

pub mod branches;
pub mod changelog;
pub mod config;
pub mod consistency;
pub mod datasets;
pub mod error;
pub mod mining;
pub mod model;
pub mod report;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use branches::{BranchModel, BranchWindow, ExceptionTables, Registry, RepositoryPolicy};
pub use config::{BosunConfig, OperationMode};
pub use consistency::{EvaluationInputs, EvaluationReport, Finding, Severity, evaluate};
pub use datasets::{DatasetError, DatasetStore};
pub use error::AuditError;
pub use mining::{BranchLogSource, GitLogSource, MembershipMiner, MiningError, MiningOutcome};
pub use model::{
    BranchMembership, ChangelogSections, MergedPullRequest, ModelError, PullRequestId,
    RepositorySlug,
};
pub use report::{ReportContext, ReportError, ReportFormat, render};
