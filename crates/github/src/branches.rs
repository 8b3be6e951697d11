//! `list_branches`: every branch, or the head branches of open pull requests.

use std::collections::HashSet;

use assistant::{BranchLister, BranchQueryResult, RepositoryRef, ToolError, ToolFailure};
use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::client::{GithubClient, Halt};
use crate::wire;

const BRANCHES_FAILED: &str = "Failed to list branches";
const PULLS_FAILED: &str = "Failed to list pull requests";

#[async_trait]
impl BranchLister for GithubClient {
    #[tracing::instrument(skip(self), fields(repo = %repo))]
    async fn list(
        &self,
        repo: &RepositoryRef,
        open_only: bool,
    ) -> Result<BranchQueryResult, ToolError> {
        let Some(token) = self.token() else {
            warn!("No GitHub token configured; not listing branches");
            return Ok(BranchQueryResult::Failed(ToolFailure::missing_token()));
        };

        match self.collect_branches(repo, open_only, token).await {
            Ok(names) => {
                info!(count = names.len(), "Listed branches");
                Ok(BranchQueryResult::Listed(names))
            }
            Err(Halt::Failed(failure)) => Ok(BranchQueryResult::Failed(failure)),
            Err(Halt::Unexpected(err)) => Err(err),
        }
    }
}

impl GithubClient {
    async fn collect_branches(
        &self,
        repo: &RepositoryRef,
        open_only: bool,
        token: &SecretString,
    ) -> Result<Vec<String>, Halt> {
        // The full branch list is always fetched first so a bad repository or
        // token is reported as a branch listing failure.
        let url = self.repo_url(repo, "branches")?;
        let branches: Vec<wire::Branch> = self.get_json(url, token, BRANCHES_FAILED).await?;
        if !open_only {
            return Ok(branches.into_iter().map(|b| b.name).collect());
        }
        debug!(total = branches.len(), "Narrowing to open pull request heads");
        self.open_pull_heads(repo, token).await
    }

    /// Head refs of every open pull request, first-seen order, no duplicates.
    ///
    /// Pages are requested from 1 upward until one comes back empty, each under
    /// its own `pulls_page` span. Any page failure discards what was gathered
    /// so far.
    async fn open_pull_heads(
        &self,
        repo: &RepositoryRef,
        token: &SecretString,
    ) -> Result<Vec<String>, Halt> {
        let mut heads = Vec::new();
        let mut seen = HashSet::new();
        let mut page: u32 = 1;

        loop {
            let mut url = self.repo_url(repo, "pulls")?;
            url.query_pairs_mut()
                .append_pair("state", "open")
                .append_pair("page", &page.to_string());

            let pulls: Vec<wire::PullListItem> = self
                .get_json(url, token, PULLS_FAILED)
                .instrument(info_span!("pulls_page", page))
                .await?;
            if pulls.is_empty() {
                break;
            }
            debug!(page, count = pulls.len(), "Fetched open pull requests");

            for pull in pulls {
                if seen.insert(pull.head.name.clone()) {
                    heads.push(pull.head.name);
                }
            }
            page += 1;
        }

        Ok(heads)
    }
}
