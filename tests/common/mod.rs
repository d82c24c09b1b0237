//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::time::Duration;

use commitlens::config::{GeminiConfig, GitHubConfig};
use commitlens::github::{Credential, GitHubClient};
use commitlens::llm::{ApiKey, GeminiClient};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Token every mock client authenticates with.
pub const TEST_TOKEN: &str = "ghp_test_token";

/// Gemini key every mock completion client sends.
pub const TEST_GEMINI_KEY: &str = "gm_test_key";

/// Model name used for the mock completion endpoint.
pub const TEST_MODEL: &str = "gemini-test";

/// Path of the mock completion endpoint.
pub fn gemini_path() -> String {
    format!("/v1beta/models/{}:generateContent", TEST_MODEL)
}

/// Create a GitHub client pointing to a mock server.
pub fn mock_github(server: &MockServer) -> GitHubClient {
    mock_github_with_timeout(server, Duration::from_secs(5))
}

pub fn mock_github_with_timeout(server: &MockServer, timeout: Duration) -> GitHubClient {
    let config = GitHubConfig {
        api_url: server.uri(),
        timeout,
    };
    GitHubClient::new(&Credential::new(TEST_TOKEN), &config).expect("Failed to build GitHub client")
}

/// Create a Gemini client pointing to a mock server.
pub fn mock_gemini(server: &MockServer) -> GeminiClient {
    let config = GeminiConfig {
        api_url: server.uri(),
        model: TEST_MODEL.to_string(),
        timeout: Duration::from_secs(5),
        ..GeminiConfig::default()
    };
    GeminiClient::new(&config, ApiKey::new(TEST_GEMINI_KEY)).expect("Failed to build Gemini client")
}

/// A `GET /user` body.
pub fn profile_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 583231,
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "name": "The Octocat",
        "followers": 9000,
        "following": 9,
        "type": "User"
    })
}

/// A repository record as `GET /user/repos` returns it (trimmed).
pub fn repo_json(name: &str) -> Value {
    json!({
        "id": 1296269,
        "name": name,
        "full_name": format!("octocat/{}", name),
        "private": false,
        "owner": {"login": "octocat", "id": 1}
    })
}

/// `count` repositories named `{prefix}-{i}`.
pub fn repo_page(prefix: &str, count: usize) -> Vec<Value> {
    (0..count).map(|i| repo_json(&format!("{}-{}", prefix, i))).collect()
}

/// A commit record as `GET /repos/{owner}/{repo}/commits` returns it (trimmed).
pub fn commit_json(sha: &str, message: &str, date: &str) -> Value {
    json!({
        "sha": sha,
        "commit": {
            "author": {"name": "Monalisa Octocat", "email": "support@github.com", "date": date},
            "committer": {"name": "Monalisa Octocat", "email": "support@github.com", "date": date},
            "message": message
        },
        "author": {"login": "octocat"}
    })
}

/// `count` commits with messages `{prefix} {i}`.
pub fn commit_page(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            commit_json(
                &format!("{:040x}", i),
                &format!("{} {}", prefix, i),
                "2024-05-01T12:00:00Z",
            )
        })
        .collect()
}

/// A successful `generateContent` body carrying `text`.
pub fn gemini_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 12, "totalTokenCount": 54}
    })
}

/// A Gemini error envelope.
pub fn gemini_error(code: u16, status: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}
