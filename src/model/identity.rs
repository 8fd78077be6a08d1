//! Identity wrappers for pull requests, repositories, and branches.
//!
//! The persisted datasets key everything by stringified pull request number.
//! [`PullRequestId`] is the canonical in-process representation: a positive
//! integer that serialises back to the bare decimal string, so keys
//! round-trip exactly through the JSON boundary.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ModelError;

/// Canonical pull request identity.
///
/// Ordered numerically, displayed and serialised as the bare decimal string
/// used by the dataset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PullRequestId(u64);

impl PullRequestId {
    /// Wraps a raw pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPullRequestId`] when the value is zero.
    pub fn new(value: u64) -> Result<Self, ModelError> {
        if value == 0 {
            return Err(ModelError::InvalidPullRequestId {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PullRequestId {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let number: u64 = value
            .parse()
            .map_err(|_| ModelError::InvalidPullRequestId {
                value: value.to_owned(),
            })?;
        Self::new(number)
    }
}

impl Serialize for PullRequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PullRequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Repository identity in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepositorySlug {
    owner: String,
    name: String,
}

impl RepositorySlug {
    /// Parses an `owner/name` slug.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRepositorySlug`] when the value does not
    /// contain exactly one `/` separating two non-empty segments.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidRepositorySlug {
            value: value.to_owned(),
        };
        let (owner, name) = value.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Borrow the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Borrow the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Maintenance branch name, e.g. `v4.1.x`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Wraps a raw branch name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyBranchName`] when the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ModelError::EmptyBranchName);
        }
        Ok(Self(value))
    }

    /// Borrow the branch name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}
