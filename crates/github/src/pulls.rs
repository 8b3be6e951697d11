//! `create_pull_request`.

use assistant::{
    PullRequestCreator, PullRequestNumber, PullRequestResult, PullRequestSpec,
    PullRequestSummary, ToolError, ToolFailure,
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::client::{decode_json, GithubClient, Halt};
use crate::wire;

const UNKNOWN_ERROR: &str = "Unknown error";
const NO_DETAILS: &str = "No additional details";

#[async_trait]
impl PullRequestCreator for GithubClient {
    #[tracing::instrument(
        skip(self, spec),
        fields(repo = %spec.repo, head = %spec.head, base = %spec.base)
    )]
    async fn create(&self, spec: &PullRequestSpec) -> Result<PullRequestResult, ToolError> {
        let Some(token) = self.token() else {
            warn!("No GitHub token configured; not creating pull request");
            return Ok(PullRequestResult::Failed(ToolFailure::missing_token()));
        };

        match self.open_pull_request(spec, token).await {
            Ok(summary) => {
                info!(number = %summary.number, url = %summary.html_url, "Created pull request");
                Ok(PullRequestResult::Created(summary))
            }
            Err(Halt::Failed(failure)) => Ok(PullRequestResult::Failed(failure)),
            Err(Halt::Unexpected(err)) => Err(err),
        }
    }
}

impl GithubClient {
    async fn open_pull_request(
        &self,
        spec: &PullRequestSpec,
        token: &SecretString,
    ) -> Result<PullRequestSummary, Halt> {
        let url = self.repo_url(&spec.repo, "pulls")?;
        let endpoint = format!("POST {}", url.path());
        let body = wire::NewPull {
            title: &spec.title,
            body: &spec.body,
            head: spec.head.as_str(),
            base: spec.base.as_str(),
        };

        let response = self
            .request(Method::POST, url, token)
            .json(&body)
            .send()
            .await
            .map_err(|err| Halt::Failed(ToolFailure::request_failed(err)))?;

        let status = response.status();
        // Only 201 means a pull request now exists; any other status,
        // including other 2xx codes, is a refusal.
        if status != StatusCode::CREATED {
            let raw = response
                .bytes()
                .await
                .map_err(|err| Halt::Failed(ToolFailure::request_failed(err)))?;
            let details = failure_details(&raw);
            warn!(status = status.as_u16(), %details, "GitHub refused pull request");
            return Err(Halt::Failed(
                ToolFailure::new(format!("Failed to create PR: {}", status.as_u16()))
                    .with_details(details),
            ));
        }

        let created: wire::CreatedPull = decode_json(response, &endpoint).await?;
        Ok(PullRequestSummary {
            number: PullRequestNumber::new(created.number),
            title: created.title,
            html_url: created.html_url,
            head: created.head.name,
            base: created.base.name,
            state: created.state,
        })
    }
}

/// The `message` of a GitHub error body, with fixed fallbacks for an empty
/// body and for a body without a message.
fn failure_details(raw: &[u8]) -> String {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return UNKNOWN_ERROR.to_string();
    }
    serde_json::from_slice::<wire::ApiError>(raw)
        .ok()
        .and_then(|err| err.message)
        .unwrap_or_else(|| NO_DETAILS.to_string())
}
