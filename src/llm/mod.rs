//! Completion service client and retry policy.

pub mod gemini;
pub mod retry;

pub use gemini::{ApiKey, CompletionService, GeminiClient, GenerationConfig};
pub use retry::{RetryPolicy, retry_with_backoff};
