//! Unit tests for the consistency engine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use rstest::rstest;

use crate::branches::{BranchModel, BranchWindow, ExceptionTables};
use crate::model::{BranchMembership, ChangelogSections, MergedPullRequest, PullRequestId};
use crate::test_support::{MergedPullRequestBuilder, branch_name, pull_request_id, timestamp};

use super::{EvaluationInputs, EvaluationReport, Finding, Severity, evaluate};

/// Evaluation harness over a three-branch cascade: `v4.0.x` closed
/// mid-2019, `v4.1.x` and `v4.2.x` open.
struct Scenario {
    pull_requests: BTreeMap<PullRequestId, MergedPullRequest>,
    membership: BranchMembership,
    changelog: ChangelogSections,
    model: BranchModel,
    exceptions: ExceptionTables,
    start_cutoff: NaiveDateTime,
}

impl Scenario {
    fn new() -> Self {
        Self {
            pull_requests: BTreeMap::new(),
            membership: BranchMembership::new(),
            changelog: ChangelogSections::new(),
            model: BranchModel::new(
                vec![
                    BranchWindow::new(
                        branch_name("v4.0.x"),
                        Some(timestamp("2019-06-01T00:00:00")),
                    ),
                    BranchWindow::new(branch_name("v4.1.x"), None),
                    BranchWindow::new(branch_name("v4.2.x"), None),
                ],
                timestamp("2019-01-01T00:00:00"),
            ),
            exceptions: ExceptionTables::default(),
            start_cutoff: timestamp("2019-01-01T00:00:00"),
        }
    }

    fn add(&mut self, builder: MergedPullRequestBuilder) {
        let (id, record) = builder.build();
        self.pull_requests.insert(id, record);
    }

    fn in_branches(&mut self, number: u64, branches: &[&str]) {
        self.membership.insert(
            pull_request_id(number),
            branches.iter().map(|name| branch_name(name)).collect::<BTreeSet<_>>(),
        );
    }

    fn in_changelog(&mut self, number: u64, section: &str) {
        self.changelog
            .insert(pull_request_id(number), section.to_owned());
    }

    fn evaluate(&self) -> EvaluationReport {
        evaluate(&EvaluationInputs {
            pull_requests: &self.pull_requests,
            membership: &self.membership,
            changelog: &self.changelog,
            model: &self.model,
            exceptions: &self.exceptions,
            start_cutoff: self.start_cutoff,
        })
    }
}

fn findings_for(report: &EvaluationReport, number: u64) -> &[Finding] {
    report
        .findings
        .get(&pull_request_id(number))
        .map(Vec::as_slice)
        .unwrap_or_else(|| panic!("expected findings entry for #{number}"))
}

#[rstest]
fn end_to_end_backport_scenario() {
    let mut scenario = Scenario::new();
    scenario.add(
        MergedPullRequestBuilder::new(100)
            .milestone("4.1")
            .merged_at("2020-01-01T00:00:00"),
    );
    scenario.in_changelog(100, "v4.1");
    scenario.in_branches(100, &["v4.1.x"]);

    let report = scenario.evaluate();
    let findings = findings_for(&report, 100);

    assert_eq!(
        findings,
        [
            Finding::valid("In correct section of changelog (v4.1)"),
            Finding::valid("Pull request was included in branch v4.1.x"),
            Finding::invalid(
                "Pull request was not included in branch v4.2.x. Backport command included below."
            ),
        ]
    );
    assert_eq!(
        report.backports.get(&branch_name("v4.2.x")),
        Some(&vec![pull_request_id(100)])
    );
    // Has an INVALID finding, so it survives the default filter.
    let flagged: Vec<PullRequestId> = report.entries(false).map(|(id, _)| id).collect();
    assert_eq!(flagged, [pull_request_id(100)]);
}

#[rstest]
fn pull_requests_merged_before_cutoff_are_out_of_scope() {
    let mut scenario = Scenario::new();
    scenario.add(
        MergedPullRequestBuilder::new(10)
            .milestone("4.1")
            .merged_at("2018-12-31T23:59:59"),
    );
    let report = scenario.evaluate();
    assert!(report.findings.is_empty());
}

#[rstest]
fn unusual_merge_label_excludes_the_pull_request() {
    let mut scenario = Scenario::new();
    scenario.add(
        MergedPullRequestBuilder::new(11)
            .milestone("4.1")
            .label("unusual-merge-dealt-with"),
    );
    let report = scenario.evaluate();
    assert!(report.findings.is_empty());
}

#[rstest]
fn closed_by_another_never_appears_in_findings() {
    let mut scenario = Scenario::new();
    scenario.exceptions = ExceptionTables::default()
        .with_closed_by_another(pull_request_id(12), pull_request_id(13));
    scenario.add(MergedPullRequestBuilder::new(12).milestone("4.1"));
    scenario.in_changelog(12, "v4.1");
    scenario.in_branches(12, &["v4.1.x", "v4.2.x"]);

    let report = scenario.evaluate();
    assert!(!report.findings.contains_key(&pull_request_id(12)));
    assert!(report.backports.is_empty());
}

#[rstest]
fn changelog_entry_with_affects_dev_label_is_tolerated_silently() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(20).label("affects-dev"));
    scenario.in_changelog(20, "v4.1");
    let report = scenario.evaluate();
    assert!(findings_for(&report, 20).is_empty());
}

#[rstest]
fn changelog_entry_despite_no_changelog_label_is_invalid() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(21).label("no-changelog-entry-needed"));
    scenario.in_changelog(21, "v4.1");
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 21),
        [Finding::invalid(
            "Labelled as no-changelog-entry-needed but in changelog"
        )]
    );
}

#[rstest]
fn changelog_entry_without_milestone_is_informational() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(22));
    scenario.in_changelog(22, "v4.1");
    let report = scenario.evaluate();
    let findings = findings_for(&report, 22);
    assert_eq!(
        findings,
        [Finding::info("In changelog (v4.1) but not milestoned")]
    );
    assert!(!findings.iter().any(Finding::is_invalid));
}

#[rstest]
fn milestone_and_section_mismatch_is_invalid() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(23).milestone("4.2"));
    scenario.in_changelog(23, "v4.1");
    scenario.in_branches(23, &["v4.2.x"]);
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 23).first(),
        Some(&Finding::invalid(
            "Milestone is v4.2 but change log section is v4.1"
        ))
    );
}

#[rstest]
fn release_candidate_suffix_is_ignored_when_comparing_sections() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(24).milestone("4.1"));
    scenario.in_changelog(24, "v4.1rc2");
    scenario.in_branches(24, &["v4.1.x", "v4.2.x"]);
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 24).first(),
        Some(&Finding::valid("In correct section of changelog (v4.1)"))
    );
}

#[rstest]
#[case(&["affects-dev"], Severity::Valid, "Labelled as affects-dev and not in changelog")]
#[case(
    &["no-changelog-entry-needed"],
    Severity::Valid,
    "Labelled as no-changelog-entry-needed and not in changelog"
)]
fn label_excuses_absence_from_changelog(
    #[case] labels: &[&str],
    #[case] severity: Severity,
    #[case] message: &str,
) {
    let mut scenario = Scenario::new();
    let mut builder = MergedPullRequestBuilder::new(25);
    for label in labels {
        builder = builder.label(label);
    }
    scenario.add(builder);
    let report = scenario.evaluate();
    let findings = findings_for(&report, 25);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings.first().map(|f| f.severity), Some(Some(severity)));
    assert_eq!(findings.first().map(|f| f.message.as_str()), Some(message));
}

#[rstest]
fn absence_from_changelog_without_milestone_is_invalid() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(26));
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 26),
        [Finding::invalid(
            "Not in changelog (and no milestone) but not labelled affects-dev"
        )]
    );
}

#[rstest]
fn earliest_pre_one_zero_milestones_are_grandfathered() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(27).milestone("0.1"));
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 27).first(),
        Some(&Finding::valid(
            "Not in changelog (but ok since milestoned as v0.1)"
        ))
    );
}

#[rstest]
fn milestoned_absence_from_changelog_is_invalid() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(28).milestone("4.1"));
    scenario.in_branches(28, &["v4.1.x", "v4.2.x"]);
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 28).first(),
        Some(&Finding::invalid(
            "Not in changelog (milestoned as v4.1) but not labelled as affects-dev"
        ))
    );
}

#[rstest]
fn early_presence_is_invalid_unless_reverted() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(30).milestone("4.1"));
    scenario.in_changelog(30, "v4.1");
    scenario.in_branches(30, &["v4.0.x", "v4.1.x", "v4.2.x"]);

    let report = scenario.evaluate();
    assert!(
        findings_for(&report, 30)
            .iter()
            .any(|f| f.is_invalid() && f.message == "Pull request was included in branch v4.0.x"),
        "unexcused early presence must be invalid"
    );

    scenario.exceptions = ExceptionTables::default()
        .with_reverted_from(pull_request_id(30), [branch_name("v4.0.x")]);
    let excused = scenario.evaluate();
    assert!(
        findings_for(&excused, 30).iter().any(|f| {
            f.severity == Some(Severity::Valid)
                && f.message == "Pull request was in branch v4.0.x but has been reverted later"
        }),
        "reverted early presence must be valid"
    );
}

#[rstest]
fn absence_before_milestone_branch_is_silent() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(31).milestone("4.1"));
    scenario.in_changelog(31, "v4.1");
    scenario.in_branches(31, &["v4.1.x", "v4.2.x"]);
    let report = scenario.evaluate();
    assert!(
        !findings_for(&report, 31)
            .iter()
            .any(|f| f.message.contains("v4.0.x")),
        "expected absence before the milestone branch is not reported"
    );
}

#[rstest]
fn manual_merge_and_whitelist_overrides_excuse_absence() {
    let mut scenario = Scenario::new();
    scenario.exceptions = ExceptionTables::default()
        .with_manual_merge(pull_request_id(32), [branch_name("v4.1.x")])
        .with_expected_missing(pull_request_id(32), [branch_name("v4.2.x")]);
    scenario.add(MergedPullRequestBuilder::new(32).milestone("4.1"));
    scenario.in_changelog(32, "v4.1");

    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 32),
        [
            Finding::valid("In correct section of changelog (v4.1)"),
            Finding::valid("Pull request was included in branch v4.1.x (manually merged)"),
            Finding::valid("Pull request was not included in branch v4.2.x (but whitelisted as ok)"),
        ]
    );
    assert!(report.backports.is_empty(), "excused absences never queue backports");
}

#[rstest]
fn closed_branch_absences_are_excused_or_unfixable_by_merge_time() {
    let mut scenario = Scenario::new();
    // Milestoned to v4.0.x so the closed branch is at the milestone index.
    scenario.add(
        MergedPullRequestBuilder::new(33)
            .milestone("4.0.1")
            .merged_at("2019-08-01T00:00:00"),
    );
    scenario.in_changelog(33, "v4.0.1");
    scenario.in_branches(33, &["v4.1.x", "v4.2.x"]);
    let report = scenario.evaluate();
    assert!(
        findings_for(&report, 33).iter().any(|f| {
            f.severity == Some(Severity::Valid)
                && f.message
                    == "Pull request was not included in branch v4.0.x (but was merged after branch closed)"
        }),
        "merged after closure is excused"
    );

    let mut late = Scenario::new();
    late.add(
        MergedPullRequestBuilder::new(34)
            .milestone("4.0.1")
            .merged_at("2019-05-01T00:00:00"),
    );
    late.in_changelog(34, "v4.0.1");
    late.in_branches(34, &["v4.1.x", "v4.2.x"]);
    let missed = late.evaluate();
    assert!(
        findings_for(&missed, 34).iter().any(|f| {
            f.severity == Some(Severity::CantFix)
                && f.message == "Pull request was not included in branch v4.0.x (but too late to fix)"
        }),
        "merged before closure can no longer be fixed"
    );
    assert!(
        missed.backports.get(&branch_name("v4.0.x")).is_none(),
        "closed branches never accumulate backports"
    );
}

#[rstest]
fn backport_worklist_is_in_merge_order_with_number_tiebreak() {
    let mut scenario = Scenario::new();
    scenario.add(
        MergedPullRequestBuilder::new(50)
            .milestone("4.1")
            .merged_at("2020-03-01T00:00:00"),
    );
    scenario.add(
        MergedPullRequestBuilder::new(41)
            .milestone("4.1")
            .merged_at("2020-01-01T00:00:00"),
    );
    scenario.add(
        MergedPullRequestBuilder::new(40)
            .milestone("4.1")
            .merged_at("2020-01-01T00:00:00"),
    );
    for number in [40, 41, 50] {
        scenario.in_changelog(number, "v4.1");
        scenario.in_branches(number, &["v4.1.x"]);
    }

    let report = scenario.evaluate();
    assert_eq!(
        report.backports.get(&branch_name("v4.2.x")),
        Some(&vec![
            pull_request_id(40),
            pull_request_id(41),
            pull_request_id(50)
        ])
    );
}

#[rstest]
fn milestone_without_tracked_branch_skips_branch_checks() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(60).milestone("5.0"));
    scenario.in_changelog(60, "v5.0");
    let report = scenario.evaluate();
    assert_eq!(
        findings_for(&report, 60),
        [Finding::valid("In correct section of changelog (v5.0)")]
    );
    assert!(report.backports.is_empty());
}

#[rstest]
fn show_all_disables_the_default_filter() {
    let mut scenario = Scenario::new();
    scenario.add(MergedPullRequestBuilder::new(70).milestone("4.1"));
    scenario.in_changelog(70, "v4.1");
    scenario.in_branches(70, &["v4.1.x", "v4.2.x"]);

    let report = scenario.evaluate();
    assert_eq!(report.entries(false).count(), 0, "all-valid entries are suppressed");
    assert_eq!(report.entries(true).count(), 1, "show-all mode surfaces them");
}
