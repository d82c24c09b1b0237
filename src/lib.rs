//! commitlens - list your GitHub repositories and commits, and get AI feedback
//! on your commit messages.
//!
//! # Overview
//!
//! A credential is validated against the GitHub API and resolved to an
//! account. The account's repositories and a chosen repository's commits are
//! listed page by page, and the commit messages are sent to Gemini for
//! feedback on clarity, conciseness, and conventional-commit style.
//!
//! [`pipeline::Pipeline`] is the call surface for front ends;
//! [`dispatch::RequestDispatcher`] runs those calls off the caller's path
//! with latest-wins semantics.

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use analysis::{AnalysisReport, CommitAnalyzer};
pub use config::Config;
pub use dispatch::{Delivery, RequestDispatcher, ResourceKind};
pub use error::{
    AnalysisError, AuthError, CompletionError, ConfigError, TransportError, UpstreamFormatError,
    ValidationError,
};
pub use github::{
    Account, CommitRecord, Credential, Listing, ListingStatus, PageRequest, RepositoryRef,
};
pub use pipeline::Pipeline;
