//! Error types for the repository assistant domain.
//!
//! Expected tool failures (missing credential, non-success status, transport
//! failure) are not errors here: they are values in [`crate::results`] that the
//! model reads and explains. The types in this module cover everything else.
//!
//! | Type | Raised by | Handled by |
//! |------|-----------|------------|
//! | [`ToolError`] | tool argument parsing, tool adapters | orchestrator, converted to a tool-result payload |
//! | [`ModelError`] | language-model adapters | propagated to the caller of `run` |
//! | [`ConversationError`] | [`crate::ConversationState`] | propagated to the caller of `run` |
//! | [`AssistantError`] | orchestrator | the front end |

use thiserror::Error;

use crate::ToolCallId;

// ---------------------------------------------------------------------------
// Tool errors
// ---------------------------------------------------------------------------

/// Unexpected failure while resolving or executing one tool call.
///
/// The orchestrator never lets these abort the loop; each becomes a
/// `{"success": false, "error": ...}` tool result instead.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model named a tool that does not exist.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// The name the model used.
        name: String,
    },

    /// A required argument is missing, has the wrong type, or is empty.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool whose arguments were rejected.
        tool: String,
        /// What was wrong.
        message: String,
    },

    /// The platform answered with a success status but an undecodable body.
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse {
        /// Endpoint description, e.g. `"GET repos/acme/widgets/branches"`.
        endpoint: String,
        /// Decoder message.
        message: String,
    },

    /// The configured API base URL cannot carry a request path.
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl {
        /// The offending URL.
        url: String,
    },
}

// ---------------------------------------------------------------------------
// Language model errors
// ---------------------------------------------------------------------------

/// Failure of the language-model collaborator.
///
/// The orchestrator does not catch these: without a working model there is
/// no sensible reply to give.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("Provider error: HTTP {status}: {body}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The provider's response could not be interpreted as a reply.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The adapter is misconfigured (e.g. unusable base URL).
    #[error("Model configuration error: {0}")]
    Configuration(String),
}

// ---------------------------------------------------------------------------
// Conversation errors
// ---------------------------------------------------------------------------

/// Violation of a [`crate::ConversationState`] invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    /// A tool result named a call id with no outstanding request.
    #[error("Tool result for call '{call_id}' does not answer any pending tool call")]
    UnmatchedToolResult {
        /// The unmatched id.
        call_id: ToolCallId,
    },
}

// ---------------------------------------------------------------------------
// Top-level errors
// ---------------------------------------------------------------------------

/// Errors returned by the orchestrator's `run`.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The language model could not be reached or answered unusably.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The conversation log rejected an append.
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}
