//! Error types for commitlens modules using thiserror.
//!
//! None of these carry the credential or the completion API key; only
//! statuses, field names and upstream messages end up in the text.

use std::time::Duration;

use thiserror::Error;

/// A caller-supplied parameter broke a documented constraint.
///
/// Always raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("per_page must be at most {max}, got {requested}")]
    PageSizeTooLarge { requested: u32, max: u32 },

    #[error("per_page must be at least 1")]
    PageSizeZero,

    #[error("page numbers start at 1, got 0")]
    PageZero,

    #[error("repository name must not be empty")]
    EmptyRepositoryName,

    #[error("invalid repository name '{0}': only letters, digits, '.', '-' and '_' are allowed")]
    InvalidRepositoryName(String),
}

/// Network failure, timeout, or an unreadable transport-level response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Credential rejected, or accepted but no usable identity behind it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("GitHub rejected the credential (HTTP {status})")]
    Rejected { status: u16 },

    #[error("missing login field")]
    MissingLogin,

    #[error("profile response was not valid JSON: {0}")]
    InvalidProfile(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A success response whose body does not have the expected shape.
///
/// Listing code uses this to decide whether to skip a record or stop a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFormatError {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has an unparseable value: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// A single call to the completion service failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion service quota exhausted (HTTP 429): {message}")]
    RateLimited { message: String },

    #[error("completion service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("completion service rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CompletionError {
    /// Quota, server and transport failures are worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Server { .. }
                | CompletionError::Transport(_)
        )
    }
}

/// Errors from commit analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no commits to analyze")]
    NoCommits,

    #[error("commit analysis failed: {0}")]
    AiService(#[source] CompletionError),

    #[error("commit analysis is not configured (set GEMINI_API_TOKEN)")]
    NotConfigured,
}

/// Errors from loading process configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "GitHub authentication failed: no token found. Set GITHUB_ACCESS_TOKEN (or GITHUB_TOKEN), pass --token, or run 'gh auth login'"
    )]
    MissingGitHubToken,

    #[error("GEMINI_API_TOKEN is not set; it is required for commit analysis")]
    MissingGeminiKey,
}
