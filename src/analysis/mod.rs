//! Commit message analysis: prompt construction and dispatch.

pub mod analyzer;
pub mod prompt;

pub use analyzer::{AnalysisReport, CommitAnalyzer};
pub use prompt::{CommitPrompt, PromptLimits, build_prompt, clean_message};
