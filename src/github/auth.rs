//! Credential handling and account resolution.
//!
//! Token discovery order:
//! 1. Explicit value (e.g. `--token`)
//! 2. GITHUB_ACCESS_TOKEN, GITHUB_TOKEN, GH_TOKEN environment variables
//! 3. `gh auth token` from an authenticated gh CLI

use std::env;
use std::fmt;
use std::process::Command;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, TransportError};
use crate::github::client::GitHubClient;

/// Profile lookup route. `type=all` matches what the web UI requests.
pub const PROFILE_ROUTE: &str = "/user?type=all";

const TOKEN_ENV_VARS: [&str; 3] = ["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Opaque bearer token for the hosting API.
///
/// Immutable and cheap to clone; every clone shares the same secret.
/// `Debug` and `Display` never print the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// The authenticated hosting identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// Public profile attributes returned alongside the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
}

impl Profile {
    pub fn account(&self) -> Account {
        Account {
            login: self.login.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RawProfile {
    login: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    followers: Option<u64>,
    following: Option<u64>,
}

/// Validates a credential and resolves the account behind it.
///
/// Never retries: a bad credential should fail on the first answer.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: GitHubClient,
}

impl AuthSession {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// `true` only when the profile lookup answers with a success status.
    ///
    /// Any other status means "invalid credential" (`false`); only a failed
    /// exchange is an error.
    pub async fn validate(&self) -> Result<bool, TransportError> {
        let response = self.client.get(PROFILE_ROUTE).await?;
        debug!(status = response.status, "credential check");
        Ok(response.is_success())
    }

    /// Resolve the account login for this credential.
    pub async fn resolve_account(&self) -> Result<Account, AuthError> {
        self.fetch_profile().await.map(|profile| profile.account())
    }

    /// Fetch the full profile. A success status without a usable login is
    /// still an [`AuthError::MissingLogin`].
    pub async fn fetch_profile(&self) -> Result<Profile, AuthError> {
        let response = self.client.get(PROFILE_ROUTE).await?;
        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
            });
        }

        parse_profile(&response.body)
    }
}

fn parse_profile(body: &str) -> Result<Profile, AuthError> {
    let raw: RawProfile =
        serde_json::from_str(body).map_err(|e| AuthError::InvalidProfile(e.to_string()))?;

    let login = raw
        .login
        .filter(|l| !l.trim().is_empty())
        .ok_or(AuthError::MissingLogin)?;

    Ok(Profile {
        login,
        name: raw.name,
        avatar_url: raw.avatar_url,
        followers: raw.followers,
        following: raw.following,
    })
}

/// Find a GitHub token using the configured discovery order.
pub fn discover_token(explicit: Option<&str>) -> Option<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    for var in TOKEN_ENV_VARS {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    get_token_from_gh_cli()
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let status = Command::new("gh").args(["auth", "status"]).output().ok()?;
    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
