//! Merged pull request records and the label/milestone policy they carry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Case-variant spellings of the "affects only the development version"
/// label that have accumulated over the observation window.
const AFFECTS_DEV_LABELS: [&str; 4] = ["Affects-dev", "affects-dev", "affect-dev", "Affect-dev"];

/// Label marking pull requests that intentionally carry no changelog entry.
const NO_CHANGELOG_LABEL: &str = "no-changelog-entry-needed";

/// Label marking pull requests whose unusual merge was reviewed by hand.
const UNUSUAL_MERGE_LABEL: &str = "unusual-merge-dealt-with";

/// Milestone sentinel that must never be prefixed with `v`.
const FUTURE_MILESTONE: &str = "Future";

/// One merged pull request as recorded in the merged-PR dataset.
///
/// Field names match the external JSON: `merged`, `updated`, and `created`
/// carry offset-free ISO-8601 timestamps. Every field is required; a record
/// missing one is a fatal parse error rather than a silent skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedPullRequest {
    /// Pull request title.
    pub title: String,
    /// Raw milestone label, if one is set. May lack the `v` prefix.
    pub milestone: Option<String>,
    /// Free-text labels attached to the pull request.
    pub labels: Vec<String>,
    /// Instant the pull request was merged.
    #[serde(rename = "merged")]
    pub merged_at: NaiveDateTime,
    /// Instant the pull request was last updated.
    #[serde(rename = "updated")]
    pub updated_at: NaiveDateTime,
    /// Instant the pull request was opened.
    #[serde(rename = "created")]
    pub created_at: NaiveDateTime,
    /// Commit that performed the merge. `None` for manual merges that left
    /// no canonical merge commit.
    pub merge_commit: Option<String>,
}

impl MergedPullRequest {
    /// Returns the milestone normalised per [`normalize_milestone`].
    #[must_use]
    pub fn normalized_milestone(&self) -> Option<String> {
        self.milestone.as_deref().map(normalize_milestone)
    }

    /// Whether any case-variant of the affects-dev label is present.
    #[must_use]
    pub fn affects_dev(&self) -> bool {
        self.labels
            .iter()
            .any(|label| AFFECTS_DEV_LABELS.contains(&label.as_str()))
    }

    /// Whether the pull request is labelled `no-changelog-entry-needed`.
    #[must_use]
    pub fn no_changelog_entry_needed(&self) -> bool {
        self.labels.iter().any(|label| label == NO_CHANGELOG_LABEL)
    }

    /// Whether the pull request is labelled `unusual-merge-dealt-with`,
    /// which excludes it from consistency evaluation.
    #[must_use]
    pub fn unusual_merge_dealt_with(&self) -> bool {
        self.labels.iter().any(|label| label == UNUSUAL_MERGE_LABEL)
    }
}

/// Normalises a raw milestone label.
///
/// Prepends `v` unless the value already starts with one or is the literal
/// sentinel `Future`. Idempotent: normalising twice equals normalising once.
#[must_use]
pub fn normalize_milestone(raw: &str) -> String {
    if raw.starts_with('v') || raw == FUTURE_MILESTONE {
        raw.to_owned()
    } else {
        format!("v{raw}")
    }
}
