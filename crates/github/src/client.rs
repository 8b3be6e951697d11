//! HTTP plumbing shared by the branch and pull request operations.

use std::time::Duration;

use assistant::{RepositoryRef, ToolError, ToolFailure};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::GithubError;

/// Public GitHub API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// Media type requested on every call.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("repo-assistant/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`GithubClient`].
///
/// The credential is injected here rather than read from the environment, so
/// tests can point the client at a mock server with a fake token.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access or installation token. `None` makes every operation
    /// fail locally with "GitHub token not configured".
    pub token: Option<SecretString>,
    /// API root; paths are appended below it (GitHub Enterprise: `.../api/v3/`).
    pub api_base: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value; GitHub rejects requests without one.
    pub user_agent: String,
}

impl GithubConfig {
    /// Creates a config with the default timeout and user agent.
    #[must_use]
    pub fn new(token: Option<SecretString>, api_base: Url) -> Self {
        Self {
            token,
            api_base,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// GitHub REST client implementing the assistant's branch and pull request ports.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

/// Why a platform call stopped before producing a value.
pub(crate) enum Halt {
    /// Expected failure, reported to the model as data.
    Failed(ToolFailure),
    /// Anything else; surfaces as a [`ToolError`].
    Unexpected(ToolError),
}

impl From<ToolError> for Halt {
    fn from(err: ToolError) -> Self {
        Halt::Unexpected(err)
    }
}

impl GithubClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::ClientBuild`] if the HTTP client cannot be
    /// initialised (e.g. TLS backend failure).
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The configured token, if any.
    pub(crate) fn token(&self) -> Option<&SecretString> {
        self.config.token.as_ref()
    }

    /// `{api_base}/repos/{owner}/{name}/{resource}` with each segment
    /// percent-encoded.
    pub(crate) fn repo_url(&self, repo: &RepositoryRef, resource: &str) -> Result<Url, ToolError> {
        let mut url = self.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| ToolError::InvalidBaseUrl {
                url: self.config.api_base.to_string(),
            })?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), resource]);
        Ok(url)
    }

    /// An authenticated request with the GitHub media type.
    pub(crate) fn request(&self, method: Method, url: Url, token: &SecretString) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token.expose_secret())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
    }

    /// GETs `url` and decodes a 2xx body; any other status becomes
    /// `"{failure_prefix}: {code}"`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
        failure_prefix: &str,
    ) -> Result<T, Halt> {
        let endpoint = format!("GET {}", url.path());
        let response = self
            .request(Method::GET, url, token)
            .send()
            .await
            .map_err(|err| Halt::Failed(ToolFailure::request_failed(err)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %endpoint, "GitHub rejected request");
            return Err(Halt::Failed(ToolFailure::new(format!(
                "{failure_prefix}: {}",
                status.as_u16()
            ))));
        }

        decode_json(response, &endpoint).await
    }
}

/// Reads the whole body and decodes it as JSON.
///
/// A body that cannot be read is a transport failure; a body that does not
/// decode is unexpected.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, Halt> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| Halt::Failed(ToolFailure::request_failed(err)))?;
    serde_json::from_slice(&bytes).map_err(|err| {
        Halt::Unexpected(ToolError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    })
}
