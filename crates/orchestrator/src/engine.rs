//! The model/tool control loop.

use std::sync::Arc;

use assistant::{
    tool_signatures, AssistantError, AssistantReply, ConversationState, LanguageModel,
    ToolSignature,
};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::dispatch::ToolDispatcher;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, GIVE_UP_MESSAGE};

/// Default ceiling on model invocations per [`Orchestrator::run`].
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Tunables for the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum model invocations per `run`. Must be at least 1.
    pub max_rounds: u32,
    /// Directive used as the conversation's first turn.
    pub system_prompt: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Drives the conversation between the user, the language model, and the tools.
///
/// One instance owns one [`ConversationState`] for its whole lifetime, so a
/// repository named in an earlier request is still visible to the model later.
/// `run` takes `&mut self`: calls on one instance are serialised by the
/// borrow checker.
pub struct Orchestrator {
    model: Arc<dyn LanguageModel>,
    tools: ToolDispatcher,
    signatures: Vec<ToolSignature>,
    state: ConversationState,
    max_rounds: u32,
}

impl Orchestrator {
    /// Creates an orchestrator with a fresh conversation.
    ///
    /// A `max_rounds` of zero is treated as one.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: ToolDispatcher,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            model,
            tools,
            signatures: tool_signatures(),
            state: ConversationState::new(config.system_prompt),
            max_rounds: config.max_rounds.max(1),
        }
    }

    /// Handles one user request and returns the assistant's final reply.
    ///
    /// Appends the user turn, then alternates: ask the model for a turn; if it
    /// requested tools, run each in order and append its result; repeat until
    /// the model answers without tool calls or the round ceiling is reached.
    ///
    /// # Errors
    ///
    /// - [`AssistantError::Model`] if the language model call fails. Turns
    ///   appended before the failure stay in the conversation.
    /// - [`AssistantError::Conversation`] if a tool result cannot be matched
    ///   to the request it answers.
    pub async fn run(&mut self, user_text: impl Into<String>) -> Result<String, AssistantError> {
        let span = info_span!(
            "assistant_run",
            session_id = %self.state.session_id(),
            started_at = %self.state.started_at(),
            rounds = tracing::field::Empty,
        );
        self.run_inner(user_text.into()).instrument(span).await
    }

    async fn run_inner(&mut self, user_text: String) -> Result<String, AssistantError> {
        self.state.push_user(user_text);

        for round in 1..=self.max_rounds {
            tracing::Span::current().record("rounds", round);
            debug!(round, max_rounds = self.max_rounds, "Requesting model turn");

            let reply = self
                .model
                .next_turn(self.state.turns(), &self.signatures)
                .await?;

            if !reply.has_tool_calls() {
                info!(round, "Model replied without tool calls");
                let text = reply.text.clone();
                self.state.push_assistant(reply);
                return Ok(text);
            }

            let calls = reply.tool_calls.clone();
            self.state.push_assistant(reply);

            for call in &calls {
                let payload = self.tools.dispatch(call).await;
                self.state.push_tool_result(call.id.clone(), payload)?;
            }
        }

        warn!(
            max_rounds = self.max_rounds,
            "Tool round ceiling reached; giving up on this request"
        );
        self.state
            .push_assistant(AssistantReply::text(GIVE_UP_MESSAGE));
        Ok(GIVE_UP_MESSAGE.to_string())
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &ConversationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use assistant::{
        BranchQueryResult, ModelError, PullRequestNumber, PullRequestResult, PullRequestSummary,
        ToolError, ToolFailure, Turn,
    };
    use serde_json::json;

    use super::*;
    use crate::test_support::{
        calls, dispatcher, garbled_tool_call, tool_call, Canned, FakeBranches, FakePullRequests, LoopingModel,
        ScriptedModel,
    };

    fn branches_ok() -> Arc<FakeBranches> {
        FakeBranches::answering(Canned::Result(BranchQueryResult::Listed(vec![
            "dev".to_string(),
            "main".to_string(),
        ])))
    }

    fn pulls_ok() -> Arc<FakePullRequests> {
        FakePullRequests::answering(Canned::Result(PullRequestResult::Created(
            PullRequestSummary {
                number: PullRequestNumber::new(7),
                title: "Add auth".to_string(),
                html_url: "http://x".to_string(),
                head: "dev".to_string(),
                base: "main".to_string(),
                state: "open".to_string(),
            },
        )))
    }

    fn orchestrator(
        model: Arc<dyn LanguageModel>,
        branches: &Arc<FakeBranches>,
        pulls: &Arc<FakePullRequests>,
    ) -> Orchestrator {
        Orchestrator::new(
            model,
            dispatcher(branches, pulls),
            OrchestratorConfig {
                max_rounds: 5,
                system_prompt: "sys".to_string(),
            },
        )
    }

    fn list_call(id: &str) -> assistant::ToolCallRequest {
        tool_call(
            id,
            "list_branches",
            json!({"repo_owner": "acme", "repo_name": "widgets"}),
        )
    }

    #[tokio::test]
    async fn plain_reply_ends_the_loop_without_tools() {
        let model = ScriptedModel::new(vec![Ok(AssistantReply::text("Hello!"))]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        assert!(branches.calls().is_empty());
        assert_eq!(model.seen().len(), 1);
        assert_eq!(orch.conversation().len(), 3);
    }

    #[tokio::test]
    async fn tool_call_result_is_fed_back_before_final_reply() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![list_call("c1")])),
            Ok(AssistantReply::text("Branches: dev, main")),
        ]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("list branches in acme/widgets").await.unwrap();

        assert_eq!(reply, "Branches: dev, main");
        assert_eq!(branches.calls().len(), 1);

        let second_view = &model.seen()[1];
        assert_eq!(
            second_view.last(),
            Some(&Turn::ToolResult {
                call_id: assistant::ToolCallId::new("c1").unwrap(),
                payload: json!({"success": true, "branches": ["dev", "main"]}),
            })
        );
    }

    #[tokio::test]
    async fn multiple_tool_calls_run_in_issue_order() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![
                tool_call(
                    "a",
                    "create_pull_request",
                    json!({
                        "repo_owner": "acme", "repo_name": "widgets",
                        "title": "Add auth", "body": "...", "head_branch": "dev",
                    }),
                ),
                list_call("b"),
            ])),
            Ok(AssistantReply::text("ok")),
        ]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model, &branches, &pulls);

        orch.run("do both").await.unwrap();

        let ids: Vec<&str> = orch
            .conversation()
            .turns()
            .iter()
            .filter_map(|t| match t {
                Turn::ToolResult { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(pulls.specs()[0].base.as_str(), "main");
    }

    #[tokio::test]
    async fn unexpected_tool_error_becomes_error_payload() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![list_call("c1")])),
            Ok(AssistantReply::text("Sorry, GitHub sent something odd.")),
        ]);
        let branches = FakeBranches::answering(Canned::Unexpected(|| {
            ToolError::MalformedResponse {
                endpoint: "GET repos/acme/widgets/branches".to_string(),
                message: "expected array".to_string(),
            }
        }));
        let pulls = pulls_ok();
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("list branches").await.unwrap();

        assert_eq!(reply, "Sorry, GitHub sent something odd.");
        let Some(Turn::ToolResult { payload, .. }) = model.seen()[1].last().cloned() else {
            panic!("expected a tool result before the second model call");
        };
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .contains("Malformed response"));
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_arguments_do_not_abort_the_loop() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![
                tool_call("x", "delete_repository", json!({})),
                tool_call("y", "list_branches", json!({"repo_owner": "acme"})),
            ])),
            Ok(AssistantReply::text("I can't do that.")),
        ]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("delete it").await.unwrap();

        assert_eq!(reply, "I can't do that.");
        assert!(branches.calls().is_empty());
        let payloads: Vec<String> = model.seen()[1]
            .iter()
            .filter_map(|t| match t {
                Turn::ToolResult { payload, .. } => payload["error"].as_str().map(String::from),
                _ => None,
            })
            .collect();
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].contains("Unknown tool: delete_repository"));
        assert!(payloads[1].contains("repo_name"));
    }

    #[tokio::test]
    async fn garbled_argument_text_becomes_error_payload() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![garbled_tool_call("g1", "list_branches", "{\"repo_owner\": ")])),
            Ok(AssistantReply::text("Let me try that again.")),
        ]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("list branches").await.unwrap();

        assert_eq!(reply, "Let me try that again.");
        assert!(branches.calls().is_empty());
        let Some(Turn::ToolResult { call_id, payload }) = model.seen()[1].last().cloned() else {
            panic!("expected a tool result before the second model call");
        };
        assert_eq!(call_id.as_str(), "g1");
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .contains("arguments are not a JSON object"));
    }

    #[tokio::test]
    async fn expected_tool_failure_is_forwarded_as_data() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![list_call("c1")])),
            Ok(AssistantReply::text("Please configure a token.")),
        ]);
        let branches = FakeBranches::answering(Canned::Result(BranchQueryResult::Failed(
            ToolFailure::missing_token(),
        )));
        let pulls = pulls_ok();
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        orch.run("list branches").await.unwrap();

        assert_eq!(
            model.seen()[1].last(),
            Some(&Turn::ToolResult {
                call_id: assistant::ToolCallId::new("c1").unwrap(),
                payload: json!({"success": false, "error": "GitHub token not configured"}),
            })
        );
    }

    #[tokio::test]
    async fn model_failure_propagates_to_caller() {
        let model = ScriptedModel::new(vec![Err(ModelError::Network("unreachable".to_string()))]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model, &branches, &pulls);

        let err = orch.run("hi").await.unwrap_err();

        assert!(matches!(err, AssistantError::Model(ModelError::Network(_))));
        // The user turn stays in the log.
        assert_eq!(orch.conversation().len(), 2);
    }

    #[tokio::test]
    async fn round_ceiling_appends_give_up_turn() {
        let model = LoopingModel::new();
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        let reply = orch.run("loop forever").await.unwrap();

        assert_eq!(reply, GIVE_UP_MESSAGE);
        assert_eq!(model.invocations(), 5);
        assert_eq!(branches.calls().len(), 5);
        assert_eq!(
            orch.conversation().last(),
            Some(&Turn::Assistant {
                text: GIVE_UP_MESSAGE.to_string(),
                tool_calls: Vec::new(),
            })
        );
        assert!(orch.conversation().pending_tool_calls().is_empty());
    }

    #[tokio::test]
    async fn zero_round_ceiling_still_allows_one_model_call() {
        let model = ScriptedModel::new(vec![Ok(AssistantReply::text("hi"))]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = Orchestrator::new(
            model,
            dispatcher(&branches, &pulls),
            OrchestratorConfig {
                max_rounds: 0,
                ..OrchestratorConfig::default()
            },
        );

        assert_eq!(orch.run("hello").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn conversation_carries_over_between_runs() {
        let model = ScriptedModel::new(vec![
            Ok(calls(vec![list_call("c1")])),
            Ok(AssistantReply::text("here are the branches")),
            Ok(calls(vec![tool_call(
                "c2",
                "create_pull_request",
                json!({
                    "repo_owner": "acme", "repo_name": "widgets",
                    "title": "dev into main", "body": "", "head_branch": "dev",
                    "base_branch": "main",
                }),
            )])),
            Ok(AssistantReply::text("Created PR #7")),
        ]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = orchestrator(model.clone(), &branches, &pulls);

        orch.run("repo is acme/widgets").await.unwrap();
        let reply = orch.run("now create a PR from dev to main").await.unwrap();

        assert_eq!(reply, "Created PR #7");
        // The third model call saw the whole first exchange plus the new request.
        let third_view = &model.seen()[2];
        assert_eq!(third_view.len(), 6);
        assert_eq!(
            third_view[1],
            Turn::User {
                text: "repo is acme/widgets".to_string()
            }
        );
        assert_eq!(
            third_view[5],
            Turn::User {
                text: "now create a PR from dev to main".to_string()
            }
        );
        assert_eq!(pulls.specs()[0].repo.to_string(), "acme/widgets");
    }

    #[tokio::test]
    async fn system_directive_is_always_first() {
        let model = ScriptedModel::new(vec![Ok(AssistantReply::text("hi"))]);
        let (branches, pulls) = (branches_ok(), pulls_ok());
        let mut orch = Orchestrator::new(
            model.clone(),
            dispatcher(&branches, &pulls),
            OrchestratorConfig::default(),
        );

        orch.run("hello").await.unwrap();

        assert_eq!(
            model.seen()[0][0],
            Turn::System {
                text: DEFAULT_SYSTEM_PROMPT.to_string()
            }
        );
    }
}
