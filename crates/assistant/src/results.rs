//! Structured tool results.
//!
//! Every expected failure mode of a tool is a value here, not an error. The
//! orchestrator serialises these with `to_payload` into the `ToolResult` turn
//! so the language model can narrate success or failure in plain language.
//!
//! Payload shapes:
//!
//! ```json
//! {"success": true, "branches": ["dev", "main"]}
//! {"success": true, "pull_request": {"number": 7, "title": "...", "html_url": "...",
//!                                    "head": "feature-x", "base": "main", "state": "open"}}
//! {"success": false, "error": "Failed to create PR: 422", "details": "Validation Failed"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::PullRequestNumber;

/// Error text returned when no GitHub credential was configured.
pub const MISSING_TOKEN_ERROR: &str = "GitHub token not configured";

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// An expected tool failure, reported back to the model as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    /// Short description, e.g. `"Failed to list branches: 404"`.
    pub error: String,
    /// Extra context from the platform, when there is any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolFailure {
    /// A failure with no details.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Attaches platform-supplied details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// The missing-credential failure.
    pub fn missing_token() -> Self {
        Self::new(MISSING_TOKEN_ERROR)
    }

    /// A transport failure (connect, timeout, TLS, ...).
    pub fn request_failed(message: impl std::fmt::Display) -> Self {
        Self::new(format!("Request failed: {message}"))
    }

    /// Renders `{"success": false, "error": ..., "details"?: ...}`.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "success": false,
            "error": self.error,
        });
        if let (Some(details), Value::Object(obj)) = (&self.details, &mut payload) {
            obj.insert("details".to_string(), Value::String(details.clone()));
        }
        payload
    }
}

// ---------------------------------------------------------------------------
// Branch listing
// ---------------------------------------------------------------------------

/// Outcome of listing a repository's branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchQueryResult {
    /// Branch names. Plain listings keep platform order; open-only listings
    /// keep first-seen order and contain no duplicates.
    Listed(Vec<String>),
    /// The listing could not be produced; no partial result is kept.
    Failed(ToolFailure),
}

impl BranchQueryResult {
    /// `true` for [`BranchQueryResult::Listed`].
    pub fn is_success(&self) -> bool {
        matches!(self, BranchQueryResult::Listed(_))
    }

    /// Renders the tool-result payload.
    pub fn to_payload(&self) -> Value {
        match self {
            BranchQueryResult::Listed(branches) => json!({
                "success": true,
                "branches": branches,
            }),
            BranchQueryResult::Failed(failure) => failure.to_payload(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pull request creation
// ---------------------------------------------------------------------------

/// The normalised subset of a created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// Number assigned by the platform.
    pub number: PullRequestNumber,
    /// Title as stored by the platform.
    pub title: String,
    /// Browser URL.
    pub html_url: String,
    /// Resolved source ref.
    pub head: String,
    /// Resolved target ref.
    pub base: String,
    /// State, normally `"open"`.
    pub state: String,
}

/// Outcome of creating a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestResult {
    /// The platform created the pull request.
    Created(PullRequestSummary),
    /// Creation was refused or never reached the platform.
    Failed(ToolFailure),
}

impl PullRequestResult {
    /// `true` for [`PullRequestResult::Created`].
    pub fn is_success(&self) -> bool {
        matches!(self, PullRequestResult::Created(_))
    }

    /// Renders the tool-result payload.
    pub fn to_payload(&self) -> Value {
        match self {
            PullRequestResult::Created(pr) => json!({
                "success": true,
                "pull_request": {
                    "number": pr.number.as_u64(),
                    "title": pr.title,
                    "html_url": pr.html_url,
                    "head": pr.head,
                    "base": pr.base,
                    "state": pr.state,
                },
            }),
            PullRequestResult::Failed(failure) => failure.to_payload(),
        }
    }
}
