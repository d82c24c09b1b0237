//! Integration tests for credential validation and account resolution.

mod common;

use std::time::Duration;

use commitlens::error::{AuthError, TransportError};
use commitlens::github::AuthSession;
use common::{TEST_TOKEN, mock_github, mock_github_with_timeout, profile_json};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_profile(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("type", "all"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_validate_accepts_working_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("octocat")))
        .expect(1)
        .mount(&server)
        .await;

    let session = AuthSession::new(mock_github(&server));
    assert!(session.validate().await.unwrap());
}

#[tokio::test]
async fn test_validate_rejected_token_is_false_not_error() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials",
            "documentation_url": "https://docs.github.com/rest"
        })),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    assert!(!session.validate().await.unwrap());
}

#[tokio::test]
async fn test_validate_forbidden_is_false() {
    let server = MockServer::start().await;
    mount_profile(&server, ResponseTemplate::new(403)).await;

    let session = AuthSession::new(mock_github(&server));
    assert!(!session.validate().await.unwrap());
}

#[tokio::test]
async fn test_validate_timeout_is_transport_error() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(profile_json("octocat"))
            .set_delay(Duration::from_millis(500)),
    )
    .await;

    let client = mock_github_with_timeout(&server, Duration::from_millis(50));
    let session = AuthSession::new(client);
    let result = session.validate().await;
    assert_eq!(
        result,
        Err(TransportError::Timeout(Duration::from_millis(50)))
    );
}

#[tokio::test]
async fn test_resolve_account_returns_login() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(profile_json("octocat")),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    let account = session.resolve_account().await.unwrap();
    assert_eq!(account.login, "octocat");
}

#[tokio::test]
async fn test_resolve_account_twice_gives_same_account() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(profile_json("octocat")),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    let first = session.resolve_account().await.unwrap();
    let second = session.resolve_account().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_resolve_account_rejected_reports_status() {
    let server = MockServer::start().await;
    mount_profile(&server, ResponseTemplate::new(401)).await;

    let session = AuthSession::new(mock_github(&server));
    assert_eq!(
        session.resolve_account().await,
        Err(AuthError::Rejected { status: 401 })
    );
}

#[tokio::test]
async fn test_resolve_account_missing_login() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "No Login"})),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    assert_eq!(
        session.resolve_account().await,
        Err(AuthError::MissingLogin)
    );
}

#[tokio::test]
async fn test_resolve_account_blank_login_is_missing() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"login": "   "})),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    assert_eq!(
        session.resolve_account().await,
        Err(AuthError::MissingLogin)
    );
}

#[tokio::test]
async fn test_resolve_account_non_json_body() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    assert!(matches!(
        session.resolve_account().await,
        Err(AuthError::InvalidProfile(_))
    ));
}

#[tokio::test]
async fn test_fetch_profile_reads_optional_fields() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(profile_json("octocat")),
    )
    .await;

    let session = AuthSession::new(mock_github(&server));
    let profile = session.fetch_profile().await.unwrap();
    assert_eq!(profile.login, "octocat");
    assert_eq!(profile.name.as_deref(), Some("The Octocat"));
    assert_eq!(profile.followers, Some(9000));
    assert_eq!(profile.following, Some(9));
    assert!(profile.avatar_url.is_some());
}
