//! Shared value types for the repository assistant domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types group
//! several identifiers into the values the tools operate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchName, RepositoryName, RepositoryOwner};

/// Target branch used when a pull request request does not name one.
pub const DEFAULT_BASE_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// Repository reference
// ---------------------------------------------------------------------------

/// A repository on the hosting platform, addressed as `owner/name`.
///
/// Never validated against the platform; an unknown repository surfaces as a
/// non-success status from the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Owning user or organisation.
    pub owner: RepositoryOwner,
    /// Repository name.
    pub name: RepositoryName,
}

impl RepositoryRef {
    /// Creates a reference, returning `None` if either part is empty.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        Some(Self {
            owner: RepositoryOwner::new(owner)?,
            name: RepositoryName::new(name)?,
        })
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Pull request creation parameters
// ---------------------------------------------------------------------------

/// Everything needed to open one pull request.
///
/// Exists only for the duration of one create call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSpec {
    /// Repository the pull request is opened in.
    pub repo: RepositoryRef,
    /// Pull request title.
    pub title: String,
    /// Pull request description.
    pub body: String,
    /// Source branch (merged FROM).
    pub head: BranchName,
    /// Target branch (merged INTO).
    pub base: BranchName,
}

impl PullRequestSpec {
    /// Creates a spec targeting [`DEFAULT_BASE_BRANCH`] when `base` is `None`.
    pub fn new(
        repo: RepositoryRef,
        title: impl Into<String>,
        body: impl Into<String>,
        head: BranchName,
        base: Option<BranchName>,
    ) -> Self {
        Self {
            repo,
            title: title.into(),
            body: body.into(),
            head,
            base: base.unwrap_or_else(BranchName::default_base),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
