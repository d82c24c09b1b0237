//! Commit history listing for one repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{UpstreamFormatError, ValidationError};
use crate::github::auth::Account;
use crate::github::client::GitHubClient;
use crate::github::pagination::{Listing, PageRequest, walk_pages};

/// One commit as the hosting API reports it.
///
/// `message` is kept verbatim; trimming and shortening only happen when a
/// prompt is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub author: Option<String>,
}

/// Lists commits of `owner/repo`, newest first, exactly as returned.
#[derive(Debug, Clone)]
pub struct CommitHistoryFetcher {
    client: GitHubClient,
}

impl CommitHistoryFetcher {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// List commits of `repo` owned by `account`, page by page.
    ///
    /// Commits without a message or an author date are skipped and counted
    /// in [`Listing::skipped`]. No client-side re-ordering happens.
    pub async fn list(
        &self,
        account: &Account,
        repo: &str,
        request: PageRequest,
    ) -> Result<Listing<CommitRecord>, ValidationError> {
        let repo = validate_repo_name(repo)?;

        let owner = account.login.as_str();
        walk_pages(
            &self.client,
            request,
            |page, per_page| commits_route(owner, repo, page, per_page),
            normalize_commit,
        )
        .await
    }
}

/// Trim `repo` and check it is a single path segment GitHub would accept
/// as a repository name.
fn validate_repo_name(repo: &str) -> Result<&str, ValidationError> {
    let repo = repo.trim();
    if repo.is_empty() {
        return Err(ValidationError::EmptyRepositoryName);
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
    if !repo.chars().all(allowed) || repo == "." || repo == ".." {
        return Err(ValidationError::InvalidRepositoryName(repo.to_string()));
    }

    Ok(repo)
}

fn commits_route(owner: &str, repo: &str, page: u32, per_page: u32) -> String {
    format!("/repos/{owner}/{repo}/commits?page={page}&per_page={per_page}")
}

/// Map one raw commit (`{sha, commit: {message, author: {name, date}}}`)
/// to a [`CommitRecord`].
pub fn normalize_commit(raw: &Value) -> Result<CommitRecord, UpstreamFormatError> {
    let commit = raw
        .get("commit")
        .filter(|c| c.is_object())
        .ok_or(UpstreamFormatError::MissingField("commit"))?;

    let message = commit
        .get("message")
        .and_then(Value::as_str)
        .ok_or(UpstreamFormatError::MissingField("commit.message"))?;

    let author = commit.get("author");
    let date = author
        .and_then(|a| a.get("date"))
        .and_then(Value::as_str)
        .ok_or(UpstreamFormatError::MissingField("commit.author.date"))?;
    let timestamp = DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| UpstreamFormatError::InvalidField {
            field: "commit.author.date",
            value: date.to_string(),
        })?;

    let author_name = author
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let sha = raw.get("sha").and_then(Value::as_str).map(str::to_string);

    Ok(CommitRecord {
        sha,
        timestamp,
        message: message.to_string(),
        author: author_name,
    })
}
