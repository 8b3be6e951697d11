//! Tool dispatch: from a model-issued [`ToolCallRequest`] to a JSON payload.

use std::sync::Arc;

use assistant::{
    BranchLister, PullRequestCreator, ToolCallRequest, ToolError, ToolInvocation,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Routes tool calls to the platform adapters.
///
/// `dispatch` never fails: unexpected tool errors are folded into a
/// `{"success": false, "error": ...}` payload so the conversation can go on.
#[derive(Clone)]
pub struct ToolDispatcher {
    branches: Arc<dyn BranchLister>,
    pull_requests: Arc<dyn PullRequestCreator>,
}

impl ToolDispatcher {
    /// Creates a dispatcher over the two tool adapters.
    pub fn new(
        branches: Arc<dyn BranchLister>,
        pull_requests: Arc<dyn PullRequestCreator>,
    ) -> Self {
        Self {
            branches,
            pull_requests,
        }
    }

    /// Executes one tool call and returns its result payload.
    #[tracing::instrument(skip(self, request), fields(tool = %request.name, call_id = %request.id))]
    pub async fn dispatch(&self, request: &ToolCallRequest) -> Value {
        match self.execute(request).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Tool call failed unexpectedly");
                error_payload(&err)
            }
        }
    }

    async fn execute(&self, request: &ToolCallRequest) -> Result<Value, ToolError> {
        let invocation = ToolInvocation::from_request(request)?;
        debug!(?invocation, "Dispatching tool call");

        let payload = match invocation {
            ToolInvocation::ListBranches { repo, open_only } => {
                self.branches.list(&repo, open_only).await?.to_payload()
            }
            ToolInvocation::CreatePullRequest(spec) => {
                self.pull_requests.create(&spec).await?.to_payload()
            }
        };
        Ok(payload)
    }
}

fn error_payload(err: &ToolError) -> Value {
    json!({
        "success": false,
        "error": err.to_string(),
    })
}
