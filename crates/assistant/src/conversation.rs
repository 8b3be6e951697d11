//! The conversation log: the assistant's only memory across requests.
//!
//! A [`ConversationState`] is an append-only sequence of [`Turn`]s. It starts
//! with one `System` directive and grows on every call to the orchestrator.
//! Turns are never edited or removed once appended; retention is the caller's
//! concern.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ConversationError;
use crate::{SessionId, Timestamp, ToolCallId};

// ---------------------------------------------------------------------------
// Turns
// ---------------------------------------------------------------------------

/// A structured request, produced by the language model, to invoke one tool.
///
/// Never constructed by the orchestrator itself; only model adapters (and
/// tests standing in for them) build these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned id; the matching tool result carries it back.
    pub id: ToolCallId,
    /// Requested tool name (see [`crate::ToolName`]).
    pub name: String,
    /// Named scalar arguments (strings, booleans).
    pub arguments: Map<String, Value>,
    /// The provider's argument text when it did not decode to a JSON object.
    /// `arguments` is then empty and the call fails validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unparsed_arguments: Option<String>,
}

/// One reply from the language model: text plus zero or more tool calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Natural-language text; may be empty when the model only calls tools.
    pub text: String,
    /// Tool calls in the order the model issued them.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantReply {
    /// A plain reply with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Returns `true` if the model asked for at least one tool call.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// Fixed directive describing the assistant's role; always the first turn.
    System {
        /// Directive text.
        text: String,
    },
    /// A request typed by the user.
    User {
        /// User text.
        text: String,
    },
    /// A model reply, possibly carrying tool-call requests.
    Assistant {
        /// Reply text.
        text: String,
        /// Tool calls requested in this turn, in issue order.
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The JSON payload produced by executing one tool call.
    ToolResult {
        /// Id of the request this result answers.
        call_id: ToolCallId,
        /// Structured result (see [`crate::results`]).
        payload: Value,
    },
}

impl From<AssistantReply> for Turn {
    fn from(reply: AssistantReply) -> Self {
        Turn::Assistant {
            text: reply.text,
            tool_calls: reply.tool_calls,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation state
// ---------------------------------------------------------------------------

/// Append-only log of turns for one session.
///
/// ## Invariants
///
/// - The first turn is the `System` directive given to [`ConversationState::new`].
/// - Every `ToolResult` answers a still-outstanding tool call, with the same
///   id, of the most recent assistant turn. Appending a later assistant turn
///   closes any calls left unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    session_id: SessionId,
    started_at: Timestamp,
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Starts a new session whose history holds only the system directive.
    pub fn new(system_text: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::new_random(),
            started_at: Timestamp::now(),
            turns: vec![Turn::System {
                text: system_text.into(),
            }],
        }
    }

    /// Session identifier, stable for the lifetime of this state.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// When the session started.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Full history, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns, including the system directive.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always `false`: a state holds at least its system directive.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User { text: text.into() });
    }

    /// Appends a model reply.
    pub fn push_assistant(&mut self, reply: AssistantReply) {
        self.turns.push(reply.into());
    }

    /// Appends the result of one tool call.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::UnmatchedToolResult`] if no earlier
    /// assistant turn requested `call_id`, or if it has already been answered.
    pub fn push_tool_result(
        &mut self,
        call_id: ToolCallId,
        payload: Value,
    ) -> Result<(), ConversationError> {
        if !self.pending_tool_calls().contains(&&call_id) {
            return Err(ConversationError::UnmatchedToolResult { call_id });
        }
        self.turns.push(Turn::ToolResult { call_id, payload });
        Ok(())
    }

    /// Ids of the latest assistant turn's tool calls that have no result yet,
    /// in request order.
    ///
    /// Only the turns after the most recent assistant turn are inspected.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCallId> {
        let mut answered: Vec<&ToolCallId> = Vec::new();
        for turn in self.turns.iter().rev() {
            match turn {
                Turn::ToolResult { call_id, .. } => answered.push(call_id),
                Turn::Assistant { tool_calls, .. } => {
                    return tool_calls
                        .iter()
                        .map(|call| &call.id)
                        .filter(|id| !answered.contains(id))
                        .collect();
                }
                Turn::System { .. } | Turn::User { .. } => break,
            }
        }
        Vec::new()
    }
}
