//! The call surface used by front ends.
//!
//! Each method is one request/response returning a typed result. Front ends
//! own no retry or pagination logic; that all lives below this layer.

use tokio::sync::OnceCell;

use crate::analysis::{AnalysisReport, CommitAnalyzer};
use crate::config::Config;
use crate::error::{AnalysisError, AuthError, TransportError, ValidationError};
use crate::github::{
    Account, AuthSession, CommitHistoryFetcher, CommitRecord, GitHubClient, Listing,
    PageRequest, Profile, RepositoryCatalog, RepositoryRef,
};
use crate::llm::GeminiClient;
use crate::llm::gemini::CompletionService;

/// Hosting API listing plus commit analysis for one credential.
///
/// Construction does no I/O; the account is resolved on first use of
/// [`Pipeline::resolve_account`] and reused afterwards. Listings and
/// analyses are never cached.
pub struct Pipeline<S = GeminiClient> {
    auth: AuthSession,
    catalog: RepositoryCatalog,
    commits: CommitHistoryFetcher,
    analyzer: Option<CommitAnalyzer<S>>,
    account: OnceCell<Account>,
}

impl Pipeline<GeminiClient> {
    /// Build clients from configuration. Analysis is available only when a
    /// Gemini key is configured.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let client = GitHubClient::new(&config.credential, &config.github)?;
        let analyzer = match &config.gemini.api_key {
            Some(key) => Some(CommitAnalyzer::new(GeminiClient::new(
                &config.gemini,
                key.clone(),
            )?)),
            None => None,
        };
        Ok(Self::new(client, analyzer))
    }
}

impl<S: CompletionService> Pipeline<S> {
    pub fn new(client: GitHubClient, analyzer: Option<CommitAnalyzer<S>>) -> Self {
        Self {
            auth: AuthSession::new(client.clone()),
            catalog: RepositoryCatalog::new(client.clone()),
            commits: CommitHistoryFetcher::new(client),
            analyzer,
            account: OnceCell::new(),
        }
    }

    pub fn can_analyze(&self) -> bool {
        self.analyzer.is_some()
    }

    /// `false` for a rejected credential; `Err` only when the lookup itself failed.
    pub async fn validate_credential(&self) -> Result<bool, TransportError> {
        self.auth.validate().await
    }

    /// Resolve the account once; later calls return the same account.
    ///
    /// A failed resolution is not remembered, so the next call asks again.
    pub async fn resolve_account(&self) -> Result<Account, AuthError> {
        self.account
            .get_or_try_init(|| self.auth.resolve_account())
            .await
            .cloned()
    }

    /// Full profile of the authenticated user. Always a fresh lookup.
    pub async fn profile(&self) -> Result<Profile, AuthError> {
        self.auth.fetch_profile().await
    }

    pub async fn list_repositories(
        &self,
        account: &Account,
        request: PageRequest,
    ) -> Result<Listing<RepositoryRef>, ValidationError> {
        self.catalog.list(account, request).await
    }

    pub async fn list_commits(
        &self,
        account: &Account,
        repo: &str,
        request: PageRequest,
    ) -> Result<Listing<CommitRecord>, ValidationError> {
        self.commits.list(account, repo, request).await
    }

    pub async fn analyze_commits(
        &self,
        batch: &[CommitRecord],
    ) -> Result<AnalysisReport, AnalysisError> {
        match &self.analyzer {
            Some(analyzer) => analyzer.analyze(batch).await,
            None if batch.is_empty() => Err(AnalysisError::NoCommits),
            None => Err(AnalysisError::NotConfigured),
        }
    }
}
