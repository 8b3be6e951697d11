//! Helpers shared by the GitHub adapter integration tests.

#![allow(dead_code)]

use github::{GithubClient, GithubConfig};
use reqwest::Url;
use secrecy::SecretString;
use wiremock::MockServer;

pub const TOKEN: &str = "ghp_test_token";

pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).unwrap()
}

pub fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubConfig::new(
        Some(SecretString::new(TOKEN.into())),
        base_url(server),
    ))
    .unwrap()
}

pub fn client_without_token(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubConfig::new(None, base_url(server))).unwrap()
}

/// A client whose requests can never connect.
pub fn unreachable_client() -> GithubClient {
    GithubClient::new(GithubConfig::new(
        Some(SecretString::new(TOKEN.into())),
        Url::parse("http://127.0.0.1:1/").unwrap(),
    ))
    .unwrap()
}
