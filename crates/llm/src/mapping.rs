//! Chat-completions wire format and its mapping to and from assistant turns.

use assistant::{AssistantReply, ModelError, ToolCallId, ToolCallRequest, ToolSignature, Turn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

const FUNCTION_KIND: &str = "function";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Chat-completions request body.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier, e.g. `"gpt-4"`.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<OutgoingMessage>,
    /// Functions the model may call; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// One message in the request, tagged by `role`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum OutgoingMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<WireToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// `{"type": "function", "function": {...}}` entry of `tools`.
#[derive(Debug, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// A tool call as carried on the wire, in either direction.
///
/// `arguments` is a JSON document encoded as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    FUNCTION_KIND.to_string()
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Chat-completions response body, reduced to what the assistant reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: IncomingMessage,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Token accounting, logged when present.
#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Builds the request for one model invocation.
#[must_use]
pub fn create_request(
    model: &str,
    temperature: f32,
    turns: &[Turn],
    tools: &[ToolSignature],
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: turns.iter().map(to_message).collect(),
        tools: tools.iter().map(to_definition).collect(),
        temperature,
    }
}

fn to_message(turn: &Turn) -> OutgoingMessage {
    match turn {
        Turn::System { text } => OutgoingMessage::System {
            content: text.clone(),
        },
        Turn::User { text } => OutgoingMessage::User {
            content: text.clone(),
        },
        Turn::Assistant { text, tool_calls } => OutgoingMessage::Assistant {
            // A tool-only reply is sent with null content.
            content: (!text.is_empty() || tool_calls.is_empty()).then(|| text.clone()),
            tool_calls: tool_calls.iter().map(to_wire_call).collect(),
        },
        Turn::ToolResult { call_id, payload } => OutgoingMessage::Tool {
            tool_call_id: call_id.to_string(),
            content: payload.to_string(),
        },
    }
}

fn to_wire_call(call: &ToolCallRequest) -> WireToolCall {
    WireToolCall {
        id: call.id.to_string(),
        kind: function_kind(),
        function: WireFunctionCall {
            name: call.name.clone(),
            arguments: call
                .unparsed_arguments
                .clone()
                .unwrap_or_else(|| Value::Object(call.arguments.clone()).to_string()),
        },
    }
}

fn to_definition(signature: &ToolSignature) -> ToolDefinition {
    ToolDefinition {
        kind: FUNCTION_KIND,
        function: FunctionDefinition {
            name: signature.name.as_str(),
            description: signature.description,
            parameters: signature.parameters_schema(),
        },
    }
}

/// Maps the first choice of a response to an [`AssistantReply`].
///
/// # Errors
///
/// Returns [`ModelError::MalformedResponse`] if there are no choices or a tool
/// call has no id. Argument text that is not a JSON object is kept on the
/// call as `unparsed_arguments` and rejected later, at dispatch.
pub fn map_response(body: ChatCompletionResponse) -> Result<AssistantReply, ModelError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::MalformedResponse("No choices returned".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(from_wire_call)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AssistantReply {
        text: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

fn from_wire_call(call: WireToolCall) -> Result<ToolCallRequest, ModelError> {
    let id = ToolCallId::new(call.id).ok_or_else(|| {
        ModelError::MalformedResponse(format!("Tool call '{}' has no id", call.function.name))
    })?;

    if call.function.arguments.trim().is_empty() {
        return Ok(ToolCallRequest {
            id,
            name: call.function.name,
            arguments: Map::new(),
            unparsed_arguments: None,
        });
    }

    match serde_json::from_str::<Value>(&call.function.arguments) {
        Ok(Value::Object(arguments)) => Ok(ToolCallRequest {
            id,
            name: call.function.name,
            arguments,
            unparsed_arguments: None,
        }),
        _ => {
            warn!(
                tool = %call.function.name,
                call_id = %id,
                "Tool call arguments are not a JSON object"
            );
            Ok(ToolCallRequest {
                id,
                name: call.function.name,
                arguments: Map::new(),
                unparsed_arguments: Some(call.function.arguments),
            })
        }
    }
}
