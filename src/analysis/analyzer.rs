//! Commit message feedback via a completion service.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::prompt::{PromptLimits, build_prompt};
use crate::error::{AnalysisError, CompletionError};
use crate::github::CommitRecord;
use crate::llm::gemini::CompletionService;
use crate::llm::retry::{RetryPolicy, retry_with_backoff};

/// Feedback for one batch of commits.
///
/// Derived on every call; the analyzer never caches reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub text: String,
    /// Number of records passed to [`CommitAnalyzer::analyze`].
    pub batch_size: usize,
    /// Number of those records that fit in the prompt.
    pub commits_in_prompt: usize,
}

/// Builds a bounded prompt from commit records and asks the completion
/// service for feedback.
///
/// Quota, server and transport failures get exactly one retry; anything
/// else surfaces at once as [`AnalysisError::AiService`].
pub struct CommitAnalyzer<S> {
    service: S,
    retry: RetryPolicy,
    limits: PromptLimits,
}

impl<S: CompletionService> CommitAnalyzer<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            retry: RetryPolicy::default(),
            limits: PromptLimits::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_prompt_limits(mut self, limits: PromptLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Analyze `batch`. An empty batch fails before any remote call.
    pub async fn analyze(&self, batch: &[CommitRecord]) -> Result<AnalysisReport, AnalysisError> {
        if batch.is_empty() {
            return Err(AnalysisError::NoCommits);
        }

        let prompt = build_prompt(batch, self.limits);
        debug!(
            batch = batch.len(),
            in_prompt = prompt.commits_included,
            "requesting commit feedback"
        );

        let text = retry_with_backoff(
            self.retry,
            || self.service.complete(&prompt.text),
            CompletionError::is_retryable,
        )
        .await
        .map_err(AnalysisError::AiService)?;

        Ok(AnalysisReport {
            text: text.trim().to_string(),
            batch_size: batch.len(),
            commits_in_prompt: prompt.commits_included,
        })
    }
}
