//! Port traits implemented by infrastructure crates.
//!
//! The orchestrator depends only on these; `github` and `llm` supply the
//! concrete adapters and tests supply in-memory fakes. All traits are
//! dyn-compatible so the composition root can hold them as `Arc<dyn _>`.

use async_trait::async_trait;

use crate::{
    AssistantReply, BranchQueryResult, ModelError, PullRequestResult, PullRequestSpec,
    RepositoryRef, ToolError, ToolSignature, Turn,
};

/// The language-model collaborator.
///
/// Given the full history and the tool catalogue, produces exactly one new
/// assistant reply: plain text, or text plus tool-call requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produces the next assistant turn.
    ///
    /// # Errors
    ///
    /// Any [`ModelError`]; callers do not recover from these.
    async fn next_turn(
        &self,
        turns: &[Turn],
        tools: &[ToolSignature],
    ) -> Result<AssistantReply, ModelError>;
}

/// Lists a repository's branches.
#[async_trait]
pub trait BranchLister: Send + Sync {
    /// Lists every branch, or with `open_only` the head branches of all open
    /// pull requests.
    ///
    /// Missing credentials, non-success statuses and transport failures are
    /// reported as [`BranchQueryResult::Failed`].
    ///
    /// # Errors
    ///
    /// [`ToolError`] only for unexpected conditions such as an undecodable
    /// success body.
    async fn list(
        &self,
        repo: &RepositoryRef,
        open_only: bool,
    ) -> Result<BranchQueryResult, ToolError>;
}

/// Opens pull requests.
#[async_trait]
pub trait PullRequestCreator: Send + Sync {
    /// Submits one pull request. Not idempotent: each call creates a new one.
    ///
    /// Missing credentials, non-201 statuses and transport failures are
    /// reported as [`PullRequestResult::Failed`].
    ///
    /// # Errors
    ///
    /// [`ToolError`] only for unexpected conditions such as an undecodable
    /// success body.
    async fn create(&self, spec: &PullRequestSpec) -> Result<PullRequestResult, ToolError>;
}
