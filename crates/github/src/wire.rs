//! GitHub REST payloads, limited to the fields the assistant reads or sends.

use serde::{Deserialize, Serialize};

/// One element of `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Deserialize)]
pub(crate) struct Branch {
    pub name: String,
}

/// A `{ "ref": ... }` object as found under `head` and `base`.
#[derive(Debug, Deserialize)]
pub(crate) struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
}

/// One element of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub(crate) struct PullListItem {
    pub head: GitRef,
}

/// Response body of a successful `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedPull {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub head: GitRef,
    pub base: GitRef,
    pub state: String,
}

/// Request body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Serialize)]
pub(crate) struct NewPull<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

/// GitHub's error envelope; only `message` is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: Option<String>,
}
