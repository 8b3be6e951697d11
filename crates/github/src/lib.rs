//! GitHub REST adapter for the repository assistant.
//!
//! [`GithubClient`] implements the `BranchLister` and `PullRequestCreator`
//! ports from the [`assistant`] crate against the GitHub v3 REST API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain conversation or tool-routing
//! rules. Authentication, URL construction, pagination and status-code
//! interpretation are handled here; the orchestrator only sees structured
//! results.
//!
//! ## Failure model
//!
//! A missing token, a non-success status and a transport failure are all
//! *expected* and come back as `Failed(ToolFailure)` inside `Ok`. A success
//! status whose body does not decode is *unexpected* and comes back as
//! `Err(ToolError::MalformedResponse)`.

mod branches;
mod client;
mod pulls;
mod wire;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_BASE, GITHUB_MEDIA_TYPE};

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}
