//! Judge0 HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use coderoom_core::{ExecutionBackend, ExecutionError, ExecutionOutput, ExecutionRequest};
use tracing::debug;

use super::protocol::SubmissionRequest;

/// Public RapidAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://judge0-ce.p.rapidapi.com";

/// Host header RapidAPI routes on.
pub const DEFAULT_RAPIDAPI_HOST: &str = "judge0-ce.p.rapidapi.com";

/// Synchronous submission: the response carries the finished run.
const SUBMISSIONS_PATH: &str = "/submissions?base64_encoded=false&wait=true";

/// Judge0 connection settings.
#[derive(Debug, Clone)]
pub struct Judge0Config {
    /// Base URL without trailing path.
    pub base_url: String,
    /// Value of the `X-RapidAPI-Host` header.
    pub rapidapi_host: String,
    /// Value of the `X-RapidAPI-Key` header. Requests go out without it when
    /// unset, and the service's rejection shows up as an execution failure.
    pub api_key: Option<String>,
    /// Upper bound for one submission round trip.
    pub timeout: Duration,
}

impl Default for Judge0Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rapidapi_host: DEFAULT_RAPIDAPI_HOST.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Runs code through a Judge0 instance.
pub struct Judge0Client {
    config: Judge0Config,
    client: reqwest::Client,
}

impl Judge0Client {
    /// Create a client with its own connection pool.
    #[must_use]
    pub fn new(config: Judge0Config) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client sharing an existing HTTP client.
    #[must_use]
    pub const fn with_client(config: Judge0Config, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub const fn config(&self) -> &Judge0Config {
        &self.config
    }

    fn submissions_url(&self) -> String {
        format!(
            "{}{SUBMISSIONS_PATH}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn transport_error(&self, e: &reqwest::Error) -> ExecutionError {
        if e.is_timeout() {
            ExecutionError::Timeout(self.config.timeout)
        } else {
            ExecutionError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, ExecutionError> {
        let body = SubmissionRequest::from(request);
        debug!(
            language_id = body.language_id,
            bytes = body.source_code.len(),
            "Submitting to Judge0"
        );

        let mut builder = self
            .client
            .post(self.submissions_url())
            .timeout(self.config.timeout)
            .header("X-RapidAPI-Host", &self.config.rapidapi_host)
            .json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("X-RapidAPI-Key", key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(ExecutionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ExecutionError::Decode(e.to_string()))
    }
}
