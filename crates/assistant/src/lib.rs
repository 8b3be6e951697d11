//! Core domain for the repository assistant.
//!
//! The assistant turns natural-language requests ("create a PR from dev to
//! main in acme/widgets") into GitHub REST calls by letting a language model
//! drive two tools. This crate holds every concept those pieces share; the
//! `orchestrator`, `github`, and `llm` crates implement behaviour on top of it.
//!
//! ## Architectural Layer
//!
//! **Domain types + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryOwner`, `BranchName`, `ToolCallId`, ...) |
//! | [`types`] | `RepositoryRef`, `PullRequestSpec`, `Timestamp` |
//! | [`conversation`] | `Turn`, `ToolCallRequest`, `AssistantReply`, `ConversationState` |
//! | [`tools`] | Closed tool catalogue: `ToolName`, `ToolInvocation`, `ToolSignature` |
//! | [`results`] | Structured tool results and their JSON payloads |
//! | [`errors`] | Error taxonomy |
//! | [`ports`] | `LanguageModel`, `BranchLister`, `PullRequestCreator` |

pub mod conversation;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod results;
pub mod tools;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use conversation::{AssistantReply, ConversationState, ToolCallRequest, Turn};
pub use errors::{AssistantError, ConversationError, ModelError, ToolError};
pub use identifiers::{
    BranchName, PullRequestNumber, RepositoryName, RepositoryOwner, SessionId, ToolCallId,
};
pub use ports::{BranchLister, LanguageModel, PullRequestCreator};
pub use results::{
    BranchQueryResult, PullRequestResult, PullRequestSummary, ToolFailure, MISSING_TOKEN_ERROR,
};
pub use tools::{
    tool_signatures, ParameterKind, ToolInvocation, ToolName, ToolParameter, ToolSignature,
};
pub use types::{PullRequestSpec, RepositoryRef, Timestamp, DEFAULT_BASE_BRANCH};
