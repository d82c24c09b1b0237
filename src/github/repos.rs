//! Repository listing for the authenticated account.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{UpstreamFormatError, ValidationError};
use crate::github::auth::Account;
use crate::github::client::GitHubClient;
use crate::github::pagination::{Listing, PageRequest, walk_pages};

/// One repository owned by an account. `name` is always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Lists the repositories of a resolved account.
///
/// Holds no state between calls: every `list` is a fresh walk.
#[derive(Debug, Clone)]
pub struct RepositoryCatalog {
    client: GitHubClient,
}

impl RepositoryCatalog {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// List repositories page by page from `request.page`.
    ///
    /// Records without a usable `name` are skipped (lenient-skip policy),
    /// as is any repeat of an `owner/name` pair already in the listing.
    pub async fn list(
        &self,
        account: &Account,
        request: PageRequest,
    ) -> Result<Listing<RepositoryRef>, ValidationError> {
        let mut listing = walk_pages(&self.client, request, repos_route, |raw| {
            normalize_repository(account, raw)
        })
        .await?;

        let mut seen = HashSet::new();
        let before = listing.items.len();
        listing.items.retain(|repo| seen.insert(repo.clone()));
        let duplicates = before - listing.items.len();
        if duplicates > 0 {
            debug!(duplicates, "dropped repeated repositories");
            listing.skipped += duplicates;
        }

        Ok(listing)
    }
}

fn repos_route(page: u32, per_page: u32) -> String {
    format!("/user/repos?page={page}&per_page={per_page}")
}

/// Map one raw repository record to a [`RepositoryRef`] owned by `account`.
pub fn normalize_repository(
    account: &Account,
    raw: &Value,
) -> Result<RepositoryRef, UpstreamFormatError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(UpstreamFormatError::MissingField("name"))?;

    Ok(RepositoryRef {
        owner: account.login.clone(),
        name: name.to_lowercase(),
    })
}
