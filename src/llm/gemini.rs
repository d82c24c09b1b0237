//! One-shot text completion against the Gemini `generateContent` endpoint.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::{CompletionError, TransportError};

/// Longest slice of an error body quoted in a [`CompletionError`].
const MAX_ERROR_SNIPPET: usize = 200;

/// Completion service API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Sampling parameters, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 256,
        }
    }
}

/// Something that turns a prompt into generated text.
///
/// This abstraction allows mocking the completion service in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `prompt` once and return the generated text (possibly empty).
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    generation: GenerationConfig,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: ApiKey) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("commitlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            endpoint,
            api_key,
            generation: config.generation,
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: &self.generation,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &body));
        }

        debug!(bytes = body.len(), "completion received");
        Ok(extract_text(&body))
    }
}

/// Map a non-success status to the matching [`CompletionError`].
pub fn classify_failure(status: u16, body: &str) -> CompletionError {
    let message = error_message(body);
    match status {
        429 => CompletionError::RateLimited { message },
        500..=599 => CompletionError::Server { status, message },
        _ => CompletionError::Rejected { status, message },
    }
}

fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    body.trim().chars().take(MAX_ERROR_SNIPPET).collect()
}

/// Concatenate the text parts of the first candidate.
///
/// Best effort: a body that does not parse, or carries no candidate, yields
/// an empty string rather than an error.
pub fn extract_text(body: &str) -> String {
    let parsed: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "completion body did not parse; returning empty text");
            return String::new();
        }
    };

    let Some(content) = parsed.candidates.into_iter().next().and_then(|c| c.content) else {
        warn!("completion had no candidate content; returning empty text");
        return String::new();
    };

    content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_wire_format() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value["topK"], 1);
        assert_eq!(value["maxOutputTokens"], 256);
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let generation = GenerationConfig::default();
        let request = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hello" }],
            }],
            generation_config: &generation,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["topP"], 1.0);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Good "},{"text":"commits."}],"role":"model"}}]}"#;
        assert_eq!(extract_text(body), "Good commits.");
    }

    #[test]
    fn test_extract_text_is_lenient() {
        assert_eq!(extract_text("not json"), "");
        assert_eq!(extract_text(r#"{"candidates":[]}"#), "");
        assert_eq!(extract_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#), "");
        assert_eq!(extract_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#), "");
    }

    #[test]
    fn test_classify_failure() {
        let quota = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            classify_failure(429, quota),
            CompletionError::RateLimited {
                message: "Resource has been exhausted".to_string()
            }
        );
        assert!(matches!(
            classify_failure(503, "upstream unavailable"),
            CompletionError::Server { status: 503, .. }
        ));
        assert!(matches!(
            classify_failure(400, "{}"),
            CompletionError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn test_endpoint_and_debug() {
        let config = GeminiConfig {
            api_url: "http://localhost:1234/".to_string(),
            model: "gemini-test".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config, ApiKey::new("gm-secret")).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
        assert!(!format!("{:?}", client).contains("gm-secret"));
    }
}
