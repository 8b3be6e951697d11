//! In-memory fakes of the assistant ports, shared by this crate's unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use assistant::{
    AssistantReply, BranchLister, BranchQueryResult, LanguageModel, ModelError,
    PullRequestCreator, PullRequestResult, PullRequestSpec, RepositoryRef, ToolCallId,
    ToolCallRequest, ToolError, ToolSignature, Turn,
};
use async_trait::async_trait;
use serde_json::Value;

use crate::ToolDispatcher;

/// Builds a tool call request from a JSON object literal.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    let Value::Object(arguments) = arguments else {
        panic!("tool call arguments must be a JSON object");
    };
    ToolCallRequest {
        id: ToolCallId::new(id).unwrap(),
        name: name.to_string(),
        arguments,
        unparsed_arguments: None,
    }
}

/// A tool call whose argument text was not a JSON object.
pub fn garbled_tool_call(id: &str, name: &str, raw: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: ToolCallId::new(id).unwrap(),
        name: name.to_string(),
        arguments: serde_json::Map::new(),
        unparsed_arguments: Some(raw.to_string()),
    }
}

/// A reply that only requests tools.
pub fn calls(tool_calls: Vec<ToolCallRequest>) -> AssistantReply {
    AssistantReply {
        text: String::new(),
        tool_calls,
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

/// Returns queued replies in order and records the history it was shown.
///
/// Once the queue is empty it answers `"done"` with no tool calls.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<AssistantReply, ModelError>>>,
    seen: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<AssistantReply, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// The history passed to each invocation, oldest invocation first.
    pub fn seen(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn next_turn(
        &self,
        turns: &[Turn],
        _tools: &[ToolSignature],
    ) -> Result<AssistantReply, ModelError> {
        self.seen.lock().unwrap().push(turns.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AssistantReply::text("done")))
    }
}

/// A model that requests the same tool on every turn.
pub struct LoopingModel {
    counter: Mutex<u32>,
}

impl LoopingModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            counter: Mutex::new(0),
        })
    }

    pub fn invocations(&self) -> u32 {
        *self.counter.lock().unwrap()
    }
}

#[async_trait]
impl LanguageModel for LoopingModel {
    async fn next_turn(
        &self,
        _turns: &[Turn],
        _tools: &[ToolSignature],
    ) -> Result<AssistantReply, ModelError> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        Ok(calls(vec![tool_call(
            &format!("loop_{counter}"),
            "list_branches",
            serde_json::json!({"repo_owner": "acme", "repo_name": "widgets"}),
        )]))
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// What a fake tool answers.
pub enum Canned<T> {
    Result(T),
    Unexpected(fn() -> ToolError),
}

/// Records every call and answers with a canned outcome.
pub struct FakeBranches {
    answer: Canned<BranchQueryResult>,
    calls: Mutex<Vec<(RepositoryRef, bool)>>,
}

impl FakeBranches {
    pub fn answering(answer: Canned<BranchQueryResult>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(RepositoryRef, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BranchLister for FakeBranches {
    async fn list(
        &self,
        repo: &RepositoryRef,
        open_only: bool,
    ) -> Result<BranchQueryResult, ToolError> {
        self.calls.lock().unwrap().push((repo.clone(), open_only));
        match &self.answer {
            Canned::Result(result) => Ok(result.clone()),
            Canned::Unexpected(make) => Err(make()),
        }
    }
}

/// Records every spec and answers with a canned outcome.
pub struct FakePullRequests {
    answer: Canned<PullRequestResult>,
    specs: Mutex<Vec<PullRequestSpec>>,
}

impl FakePullRequests {
    pub fn answering(answer: Canned<PullRequestResult>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            specs: Mutex::new(Vec::new()),
        })
    }

    pub fn specs(&self) -> Vec<PullRequestSpec> {
        self.specs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestCreator for FakePullRequests {
    async fn create(&self, spec: &PullRequestSpec) -> Result<PullRequestResult, ToolError> {
        self.specs.lock().unwrap().push(spec.clone());
        match &self.answer {
            Canned::Result(result) => Ok(result.clone()),
            Canned::Unexpected(make) => Err(make()),
        }
    }
}

/// A dispatcher over the two fakes.
pub fn dispatcher(branches: &Arc<FakeBranches>, pulls: &Arc<FakePullRequests>) -> ToolDispatcher {
    ToolDispatcher::new(branches.clone(), pulls.clone())
}
