//! Process configuration.
//!
//! Loaded once at startup by [`Config::from_env`] and passed explicitly into
//! the pipeline. Nothing reads the environment after that.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::github::auth::{Credential, discover_token};
use crate::llm::gemini::{ApiKey, GenerationConfig};

/// Default per-request timeout for both remote services.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

const TIMEOUT_ENV_VAR: &str = "COMMITLENS_HTTP_TIMEOUT";
const GITHUB_URL_ENV_VAR: &str = "COMMITLENS_GITHUB_API_URL";
const GEMINI_URL_ENV_VAR: &str = "COMMITLENS_GEMINI_API_URL";
const GEMINI_MODEL_ENV_VAR: &str = "COMMITLENS_GEMINI_MODEL";
const GEMINI_KEY_ENV_VAR: &str = "GEMINI_API_TOKEN";

/// Hosting API settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<ApiKey>,
    pub timeout: Duration,
    pub generation: GenerationConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            generation: GenerationConfig::default(),
        }
    }
}

/// Immutable configuration for one process.
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub github: GitHubConfig,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Build the configuration from the environment.
    ///
    /// `token_override` (e.g. a `--token` flag) wins over every other
    /// credential source. The Gemini key is optional here; analysis checks
    /// for it separately so listing works without one.
    pub fn from_env(token_override: Option<&str>) -> Result<Self, ConfigError> {
        let credential = discover_token(token_override)
            .map(Credential::new)
            .ok_or(ConfigError::MissingGitHubToken)?;

        let timeout = get_timeout();

        let github = GitHubConfig {
            api_url: non_empty_var(GITHUB_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            timeout,
        };

        let gemini = GeminiConfig {
            api_url: non_empty_var(GEMINI_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            model: non_empty_var(GEMINI_MODEL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: non_empty_var(GEMINI_KEY_ENV_VAR).map(ApiKey::new),
            timeout,
            generation: GenerationConfig::default(),
        };

        Ok(Self {
            credential,
            github,
            gemini,
        })
    }

    /// The Gemini key, or the error to show when analysis is requested without one.
    pub fn require_gemini_key(&self) -> Result<&ApiKey, ConfigError> {
        self.gemini
            .api_key
            .as_ref()
            .ok_or(ConfigError::MissingGeminiKey)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read the request timeout, falling back to the default on bad input.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
