//! Explicit repository-to-policy registry.
//!
//! The branch model and exception tables for each tracked repository are
//! looked up through a registry value rather than ambient module state, so
//! one process can audit several repositories in sequence without hidden
//! cross-call coupling.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::model::{BranchName, PullRequestId, RepositorySlug, parse_timestamp};

use super::exceptions::ExceptionTables;
use super::model::{BranchModel, BranchWindow};

/// Everything the consistency engine needs to know about one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPolicy {
    /// Ordered branch list with closure dates and the audit start cutoff.
    pub model: BranchModel,
    /// Static overrides for untrustworthy branch history.
    pub exceptions: ExceptionTables,
}

/// Registry of repository policies keyed by `owner/name` slug.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    policies: BTreeMap<String, RepositoryPolicy>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// Registers or replaces the policy for a repository.
    pub fn insert(&mut self, slug: &RepositorySlug, policy: RepositoryPolicy) {
        self.policies.insert(slug.to_string(), policy);
    }

    /// Looks up the policy for a repository.
    #[must_use]
    pub fn get(&self, slug: &RepositorySlug) -> Option<&RepositoryPolicy> {
        self.policies.get(&slug.to_string())
    }

    /// Registry seeded with the built-in astropy configuration.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let astropy = RepositorySlug::parse("astropy/astropy");
        let helpers = RepositorySlug::parse("astropy/astropy-helpers");
        if let (Ok(astropy), Ok(helpers)) = (astropy, helpers) {
            registry.insert(
                &astropy,
                RepositoryPolicy {
                    model: astropy_branch_model(),
                    exceptions: astropy_exceptions(),
                },
            );
            // astropy-helpers shares the branch lifecycle of the main
            // repository but carries its own manual-merge history.
            registry.insert(
                &helpers,
                RepositoryPolicy {
                    model: astropy_branch_model(),
                    exceptions: helpers_exceptions(),
                },
            );
        }
        registry
    }
}

#[expect(
    clippy::expect_used,
    reason = "built-in table entries are nonzero literals"
)]
fn pr(number: u64) -> PullRequestId {
    PullRequestId::new(number).expect("built-in pull request numbers are positive")
}

#[expect(clippy::expect_used, reason = "built-in branch names are non-empty")]
fn branch(name: &str) -> BranchName {
    BranchName::new(name).expect("built-in branch names are non-empty")
}

fn branches(names: &[&str]) -> Vec<BranchName> {
    names.iter().map(|name| branch(name)).collect()
}

#[expect(
    clippy::expect_used,
    reason = "built-in timestamps are valid literals"
)]
fn instant(value: &str) -> NaiveDateTime {
    parse_timestamp(value).expect("built-in timestamps are valid")
}

/// Branch lifecycle for `astropy/astropy`: the start cutoff is the instant
/// the `v1.0.x` branch was created.
fn astropy_branch_model() -> BranchModel {
    let closed = |name: &str, at: &str| BranchWindow::new(branch(name), Some(instant(at)));
    let open = |name: &str| BranchWindow::new(branch(name), None);
    BranchModel::new(
        vec![
            closed("v0.1.x", "2012-06-19T02:09:53"),
            closed("v0.2.x", "2013-10-25T12:29:58"),
            closed("v0.3.x", "2014-05-13T12:06:04"),
            closed("v0.4.x", "2015-05-29T15:44:38"),
            closed("v1.0.x", "2017-05-29T23:44:38"),
            closed("v1.1.x", "2016-03-10T01:09:50"),
            closed("v1.2.x", "2016-12-23T05:32:04"),
            closed("v1.3.x", "2017-05-29T23:44:38"),
            closed("v2.0.x", "2019-11-10T16:00:00"),
            closed("v3.0.x", "2018-10-18T16:00:00"),
            closed("v3.1.x", "2019-04-15T16:00:00"),
            closed("v3.2.x", "2019-11-10T16:00:00"),
            open("v4.0.x"),
            closed("v4.1.x", "2020-11-25T06:46:46"),
            open("v4.2.x"),
            open("v4.3.x"),
        ],
        instant("2015-01-27T16:22:59"),
    )
}

fn astropy_exceptions() -> ExceptionTables {
    let mut tables = ExceptionTables::default();
    for (number, names) in [
        (8264_u64, &["v2.0.x"][..]),
        (7575, &["v2.0.x"]),
        (7336, &["v2.0.x"]),
        (7274, &["v2.0.x"]),
        (6605, &["v2.0.x"]),
        (6555, &["v2.0.x"]),
        (6423, &["v2.0.x"]),
        (4792, &["v1.2.x"]),
        (4539, &["v1.0.x"]),
        (4423, &["v1.2.x"]),
        (4341, &["v1.1.x"]),
        (4254, &["v1.0.x"]),
        (4719, &["v1.2.x"]),
        (4201, &["v1.0.x", "v1.1.x", "v1.2.x"]),
        (9183, &["v4.3.x"]),
        (10437, &["v4.0.x"]),
        (11108, &["v4.2.x"]),
        (11128, &["v4.2.x"]),
        (11145, &["v4.2.x"]),
        (11389, &["v4.2.x"]),
        (11391, &["v4.2.x"]),
        (11401, &["v4.2.x"]),
        (11250, &["v4.2.x"]),
        (11756, &["v4.3.x"]), // bot did this one in 11766
        (11724, &["v4.3.x"]), // bot did this one in 11799
    ] {
        tables = tables.with_manual_merge(pr(number), branches(names));
    }
    tables
        // Forgot to backport to v1.1.x.
        .with_expected_missing(pr(4266), branches(&["v1.1.x"]))
        // Reverted from the branch after inclusion.
        .with_reverted_from(pr(6277), branches(&["v2.0.x"]))
        .with_closed_by_another(pr(3624), pr(3697))
        .with_closed_by_another(pr(2676), pr(2680))
}

fn helpers_exceptions() -> ExceptionTables {
    let cascade = &[
        "v1.1.x", "v1.2.x", "v1.3.x", "v2.0.x", "v3.0.x", "v3.1.x", "v3.2.x", "v4.0.x",
    ][..];
    ExceptionTables::default()
        .with_manual_merge(pr(205), branches(cascade))
        .with_manual_merge(pr(172), branches(cascade))
        .with_manual_merge(
            pr(206),
            branches(&[
                "v1.0.x", "v1.1.x", "v1.2.x", "v1.3.x", "v2.0.x", "v3.0.x", "v3.1.x", "v3.2.x",
                "v4.0.x",
            ]),
        )
        .with_manual_merge(pr(362), branches(&["v2.0.x"]))
}
