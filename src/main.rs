//! Bosun CLI entrypoint for pull request consistency auditing.

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use bosun::{
    AuditError, BosunConfig, DatasetStore, EvaluationInputs, GitLogSource, MembershipMiner,
    OperationMode, Registry, ReportContext, ReportFormat, evaluate, render,
};
use ortho_config::OrthoConfig;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AuditError> {
    let config = load_config()?;
    match config.operation_mode() {
        OperationMode::CheckConsistency => check_consistency(&config),
        OperationMode::MineBranches => mine_branches(&config),
        OperationMode::ResolveChangelog => resolve_changelog(&config),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`AuditError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<BosunConfig, AuditError> {
    BosunConfig::load().map_err(|error| AuditError::Configuration {
        message: error.to_string(),
    })
}

fn check_consistency(config: &BosunConfig) -> Result<(), AuditError> {
    let repository = config.repository()?;
    let registry = Registry::builtin();
    let policy = registry
        .get(&repository)
        .ok_or_else(|| AuditError::UnknownRepository {
            repository: repository.to_string(),
        })?;

    let store = DatasetStore::new(config.data_dir(), repository.clone());
    let pull_requests = store.load_merged_pull_requests()?;
    let membership = store.load_branch_membership()?;
    let changelog = store.load_changelog_sections()?;

    let start_cutoff = config
        .start_cutoff_override()?
        .unwrap_or_else(|| policy.model.start_cutoff());

    let report = evaluate(&EvaluationInputs {
        pull_requests: &pull_requests,
        membership: &membership,
        changelog: &changelog,
        model: &policy.model,
        exceptions: &policy.exceptions,
        start_cutoff,
    });

    let context = ReportContext {
        repository: &repository,
        pull_requests: &pull_requests,
        report: &report,
        show_all: config.show_all,
    };
    let format = if config.html {
        ReportFormat::Html
    } else {
        ReportFormat::Text
    };
    let mut stdout = io::stdout().lock();
    render(&mut stdout, format, &context)?;
    Ok(())
}

fn mine_branches(config: &BosunConfig) -> Result<(), AuditError> {
    let repository = config.repository()?;
    let registry = Registry::builtin();
    let policy = registry
        .get(&repository)
        .ok_or_else(|| AuditError::UnknownRepository {
            repository: repository.to_string(),
        })?;

    let store = DatasetStore::new(config.data_dir(), repository.clone());
    let pull_requests: Vec<_> = store.load_merged_pull_requests()?.into_keys().collect();
    let branches: Vec<_> = policy.model.names().cloned().collect();

    let clone_path = config.require_clone_path()?;
    let source = GitLogSource::open(&clone_path)?;
    let miner = MembershipMiner::new(&source);
    let outcome = miner.mine_and_persist(&branches, &pull_requests, &store)?;

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Mined branch membership for {} pull requests across {} branches ({} warnings) into {}",
        outcome.membership.len(),
        branches.len(),
        outcome.warnings.len(),
        store.branch_membership_path()
    )
    .map_err(|error| AuditError::Io {
        message: error.to_string(),
    })
}

fn resolve_changelog(config: &BosunConfig) -> Result<(), AuditError> {
    let repository = config.repository()?;
    let changelog_path = config.require_changelog_path()?;
    let text = fs::read_to_string(&changelog_path).map_err(|error| AuditError::Io {
        message: format!("failed to read {changelog_path}: {error}"),
    })?;

    let sections = bosun::changelog::resolve_sections(&text);
    let store = DatasetStore::new(config.data_dir(), repository);
    store.write_changelog_sections(&sections)?;

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Resolved changelog sections for {} pull requests into {}",
        sections.len(),
        store.changelog_sections_path()
    )
    .map_err(|error| AuditError::Io {
        message: error.to_string(),
    })
}
