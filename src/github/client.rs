//! Bounded-time GET requests against the GitHub REST API via octocrab.

use std::fmt;
use std::time::Duration;

use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde_json::Value;

use crate::config::GitHubConfig;
use crate::error::{TransportError, UpstreamFormatError};
use crate::github::auth::Credential;

/// Status and raw body of one hosting API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON without assuming any particular shape.
    pub fn json(&self) -> Result<Value, UpstreamFormatError> {
        serde_json::from_str(&self.body).map_err(|e| UpstreamFormatError::InvalidJson(e.to_string()))
    }
}

/// Read-only GitHub client bound to one credential.
///
/// Cloning is cheap and shares the underlying connection pool. octocrab's
/// own retry middleware is switched off: callers decide whether to retry.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubClient {
    /// Build a client that sends `Authorization: Bearer <credential>`.
    pub fn new(credential: &Credential, config: &GitHubConfig) -> Result<Self, TransportError> {
        let octocrab = Octocrab::builder()
            .personal_token(credential.expose().to_string())
            .base_uri(config.api_url.as_str())
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self::with_client(octocrab, config.timeout))
    }

    /// Wrap a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one GET for `route` (path plus query string).
    ///
    /// Non-success statuses are returned, not turned into errors; only a
    /// failed or stalled exchange is a [`TransportError`].
    pub async fn get(&self, route: &str) -> Result<ApiResponse, TransportError> {
        let exchange = async {
            let response = self
                .octocrab
                ._get(route)
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            let status = response.status().as_u16();
            let body = self
                .octocrab
                .body_to_string(response)
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;
            Ok(ApiResponse { status, body })
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = ApiResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = ApiResponse {
            status: 304,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_json_reports_garbage_body() {
        let response = ApiResponse {
            status: 200,
            body: "<html>oops</html>".to_string(),
        };
        assert!(matches!(
            response.json(),
            Err(UpstreamFormatError::InvalidJson(_))
        ));
    }
}
