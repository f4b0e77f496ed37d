//! Core trait for code execution.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::Language;

/// Room identifier. Opaque to the server.
pub type RoomKey = String;

/// Identifies one live transport connection.
pub type ConnectionId = Uuid;

/// Shown when an execution produced no output at all.
pub const NO_OUTPUT: &str = "No Output";

/// Shown when the execution service could not be reached or answered badly.
pub const EXECUTION_FAILED: &str = "Execution Failed";

/// Source code to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Program text.
    pub source_code: String,
    /// Language to run it as.
    pub language: Language,
}

/// Captured output of a finished execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionOutput {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
}

impl ExecutionOutput {
    /// Text shown to the room: the first non-empty of stdout, stderr and
    /// compiler output, or [`NO_OUTPUT`].
    #[must_use]
    pub fn display_text(&self) -> &str {
        [&self.stdout, &self.stderr, &self.compile_output]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map_or(NO_OUTPUT, String::as_str)
    }
}

/// Execution error.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Request failed: {0}")]
    Http(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Trait for remote code runners.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Run `request` to completion and return what it printed.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: Option<&str>, stderr: Option<&str>, compile: Option<&str>) -> ExecutionOutput {
        ExecutionOutput {
            stdout: stdout.map(str::to_string),
            stderr: stderr.map(str::to_string),
            compile_output: compile.map(str::to_string),
        }
    }

    #[test]
    fn test_stdout_wins() {
        let out = output(Some("1\n"), Some("warn"), Some("note"));
        assert_eq!(out.display_text(), "1\n");
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let out = output(Some(""), None, Some("error: expected ';'"));
        assert_eq!(out.display_text(), "error: expected ';'");

        let out = output(None, Some("Traceback"), None);
        assert_eq!(out.display_text(), "Traceback");
    }

    #[test]
    fn test_no_output_marker() {
        assert_eq!(ExecutionOutput::default().display_text(), NO_OUTPUT);
        assert_eq!(output(Some(""), Some(""), Some("")).display_text(), NO_OUTPUT);
    }

    struct Echo;

    #[async_trait]
    impl ExecutionBackend for Echo {
        async fn execute(
            &self,
            request: &ExecutionRequest,
        ) -> Result<ExecutionOutput, ExecutionError> {
            Ok(ExecutionOutput {
                stdout: Some(request.source_code.clone()),
                ..ExecutionOutput::default()
            })
        }
    }

    #[test]
    fn test_backend_as_trait_object() {
        let backend: Box<dyn ExecutionBackend> = Box::new(Echo);
        let request = ExecutionRequest {
            source_code: "hello".to_string(),
            language: Language::Python,
        };
        let out = tokio_test::block_on(backend.execute(&request)).unwrap();
        assert_eq!(out.display_text(), "hello");
    }
}
