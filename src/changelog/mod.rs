//! Changelog section resolution.
//!
//! A changelog is a sequence of version blocks, each introduced by a title
//! line and an underline of one repeated character: `=` in the current
//! convention, `-` in the legacy one. The first underline encountered locks
//! the convention for the whole document; underlines of the other style are
//! treated as ordinary body text, so a row of dashes under a sub-heading in
//! an `=`-style document does not open a new version block. Documents that
//! genuinely mix conventions are a known limitation.
//!
//! Within a block, pull requests are referenced in bracketed or
//! parenthesized runs such as `[#1234]` or `(#1234, #1250)`. The first
//! section that mentions a pull request wins; later mentions never
//! reassign it.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ChangelogSections, PullRequestId};

/// A run of pull request references: `[#123]`, `(#123, #456)`, and the like.
static REFERENCE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "pattern literal is known valid")]
    Regex::new(r"[\[(]#[0-9]+(?:[\s,]+#[0-9]+)*[\])]").expect("reference-run pattern is valid")
});

/// A single `#123` token inside a reference run.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "pattern literal is known valid")]
    Regex::new(r"#([0-9]+)").expect("reference pattern is valid")
});

/// Underline characters that introduce a version block.
const UNDERLINE_DELIMITERS: [char; 2] = ['=', '-'];

/// Minimum underline length; shorter runs are body punctuation.
const MIN_UNDERLINE_LEN: usize = 4;

/// Resolves, for every pull request mentioned in the changelog, the version
/// section it first appears in.
///
/// Single forward pass, no backtracking. Section versions are normalised:
/// a trailing parenthesized date and a leading `Version ` token are
/// stripped, and a `v` prefix is ensured.
#[must_use]
pub fn resolve_sections(text: &str) -> ChangelogSections {
    let mut sections = ChangelogSections::new();
    let mut convention: Option<char> = None;
    let mut version: Option<String> = None;
    let mut body = String::new();
    let mut previous: Option<&str> = None;

    for line in text.lines() {
        let delimiter = underline_delimiter(line);
        let opens_block = delimiter
            .is_some_and(|found| *convention.get_or_insert(found) == found);
        if opens_block {
            flush_block(&mut sections, version.as_deref(), &body);
            version = previous.and_then(derive_version);
            body.clear();
        } else if version.is_some() {
            // Bodies are concatenated without separators; reference runs
            // never span the artificial line joins because they sit on one
            // physical line in practice.
            body.push_str(line);
        }
        previous = Some(line);
    }
    flush_block(&mut sections, version.as_deref(), &body);

    sections
}

/// Returns the underline character if the line is an underline candidate.
fn underline_delimiter(line: &str) -> Option<char> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !UNDERLINE_DELIMITERS.contains(&first) {
        return None;
    }
    if trimmed.chars().count() < MIN_UNDERLINE_LEN {
        return None;
    }
    chars.all(|c| c == first).then_some(first)
}

/// Derives the version string for a block from its title line.
fn derive_version(title: &str) -> Option<String> {
    let without_date = title.split('(').next().unwrap_or(title).trim();
    let version = without_date
        .strip_prefix("Version ")
        .unwrap_or(without_date)
        .trim();
    if version.is_empty() {
        return None;
    }
    if version.starts_with('v') {
        Some(version.to_owned())
    } else {
        Some(format!("v{version}"))
    }
}

/// Records every pull request referenced in the block body, first
/// assignment winning.
fn flush_block(sections: &mut ChangelogSections, version: Option<&str>, body: &str) {
    let Some(version) = version else {
        return;
    };
    for run in REFERENCE_RUN.find_iter(body) {
        for reference in REFERENCE.captures_iter(run.as_str()) {
            let Some(digits) = reference.get(1) else {
                continue;
            };
            if let Ok(id) = digits.as_str().parse::<PullRequestId>() {
                sections.entry(id).or_insert_with(|| version.to_owned());
            }
        }
    }
}
