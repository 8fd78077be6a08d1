//! Unit tests for the branch membership miner.

use std::collections::BTreeSet;

use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

use crate::datasets::DatasetStore;
use crate::model::{BranchName, PullRequestId, RepositorySlug};

use super::{DuplicateMarker, MembershipMiner, MiningError, MockBranchLogSource};

fn name(value: &str) -> BranchName {
    BranchName::new(value).expect("branch name should be valid")
}

fn id(value: u64) -> PullRequestId {
    PullRequestId::new(value).expect("pull request number should be positive")
}

/// Mock source serving canned logs per branch, empty full logs by default.
fn canned_source(
    first_parent: &'static [(&'static str, &'static str)],
    full: &'static [(&'static str, &'static str)],
) -> MockBranchLogSource {
    let mut source = MockBranchLogSource::new();
    source.expect_first_parent_log().returning(move |branch| {
        Ok(first_parent
            .iter()
            .find(|(candidate, _)| *candidate == branch.as_str())
            .map(|(_, log)| (*log).to_owned())
            .unwrap_or_default())
    });
    source.expect_full_log().returning(move |branch| {
        Ok(full
            .iter()
            .find(|(candidate, _)| *candidate == branch.as_str())
            .map(|(_, log)| (*log).to_owned())
            .unwrap_or_default())
    });
    source
}

#[rstest]
fn records_presence_from_merge_marker() {
    let source = canned_source(
        &[(
            "v4.1.x",
            "Merge pull request #100 from octo/fix\n\nFix the widget\n",
        )],
        &[],
    );
    let miner = MembershipMiner::new(&source);
    let outcome = miner
        .mine(&[name("v4.1.x"), name("v4.2.x")], &[id(100)])
        .expect("mining should succeed");

    assert_eq!(
        outcome.membership.get(&id(100)),
        Some(&BTreeSet::from([name("v4.1.x")]))
    );
    assert!(outcome.warnings.is_empty());
}

#[rstest]
fn merge_marker_requires_exact_number_boundary() {
    let source = canned_source(
        &[("v4.1.x", "Merge pull request #70 from octo/other\n")],
        &[],
    );
    let miner = MembershipMiner::new(&source);
    let outcome = miner
        .mine(&[name("v4.1.x")], &[id(7), id(70)])
        .expect("mining should succeed");

    assert!(outcome.membership.get(&id(7)).is_none(), "#7 must not match #70");
    assert!(outcome.membership.contains_key(&id(70)));
}

#[rstest]
fn falls_back_to_backport_marker_in_full_log() {
    let source = canned_source(
        &[("v4.1.x", "Some unrelated merge\n")],
        &[("v4.1.x", "Backport PR #100: fix the widget\n")],
    );
    let miner = MembershipMiner::new(&source);
    let outcome = miner
        .mine(&[name("v4.1.x")], &[id(100)])
        .expect("mining should succeed");

    assert_eq!(
        outcome.membership.get(&id(100)),
        Some(&BTreeSet::from([name("v4.1.x")]))
    );
}

#[rstest]
fn duplicate_marker_is_warned_but_not_fatal() {
    let source = canned_source(
        &[(
            "v4.1.x",
            "Merge pull request #7 from octo/a\nMerge pull request #7 from octo/a\n",
        )],
        &[],
    );
    let miner = MembershipMiner::new(&source);
    let outcome = miner
        .mine(&[name("v4.1.x")], &[id(7)])
        .expect("duplicate markers must not abort the run");

    assert!(
        outcome
            .membership
            .get(&id(7))
            .is_some_and(|set| set.contains(&name("v4.1.x")))
    );
    assert_eq!(
        outcome.warnings,
        vec![DuplicateMarker {
            pull_request: id(7),
            branch: name("v4.1.x"),
            occurrences: 2,
        }]
    );
}

#[rstest]
fn membership_is_independent_of_branch_order() {
    let logs: &[(&str, &str)] = &[
        ("v4.0.x", "Merge pull request #5 from octo/a\n"),
        (
            "v4.1.x",
            "Merge pull request #5 from octo/a\nMerge pull request #9 from octo/b\n",
        ),
        ("v4.2.x", "Merge pull request #9 from octo/b\n"),
    ];
    let source = canned_source(logs, &[]);
    let miner = MembershipMiner::new(&source);
    let prs = [id(5), id(9)];

    let forward = miner
        .mine(&[name("v4.0.x"), name("v4.1.x"), name("v4.2.x")], &prs)
        .expect("mining should succeed");
    let reversed = miner
        .mine(&[name("v4.2.x"), name("v4.1.x"), name("v4.0.x")], &prs)
        .expect("mining should succeed");

    assert_eq!(forward.membership, reversed.membership);
}

#[rstest]
fn mine_and_persist_flushes_partial_result_on_failure() {
    let dir = TempDir::new().expect("tempdir");
    let data_dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temporary directory path should be UTF-8");
    let slug = RepositorySlug::parse("astropy/astropy").expect("slug should parse");
    let store = DatasetStore::new(data_dir, slug);

    let mut source = MockBranchLogSource::new();
    source.expect_first_parent_log().returning(|branch| {
        if branch.as_str() == "v4.0.x" {
            Ok("Merge pull request #5 from octo/a\n".to_owned())
        } else {
            Err(MiningError::LogUnavailable {
                branch: branch.clone(),
                message: "corrupt odb".to_owned(),
            })
        }
    });
    source.expect_full_log().returning(|_| Ok(String::new()));

    let miner = MembershipMiner::new(&source);
    let result = miner.mine_and_persist(&[name("v4.0.x"), name("v4.1.x")], &[id(5)], &store);

    assert!(
        matches!(result, Err(MiningError::LogUnavailable { .. })),
        "the mining failure must propagate, got {result:?}"
    );
    let flushed = store
        .load_branch_membership()
        .expect("partial membership must still be flushed");
    assert_eq!(
        flushed.get(&id(5)),
        Some(&BTreeSet::from([name("v4.0.x")]))
    );
}
