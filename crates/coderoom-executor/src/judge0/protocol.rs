//! Judge0 request types.
//!
//! Responses decode straight into [`coderoom_core::ExecutionOutput`]; fields
//! we do not show (status, time, memory) are ignored.

use coderoom_core::{ExecutionRequest, Language};
use serde::Serialize;

/// Judge0 language id for `language`.
#[must_use]
pub const fn language_id(language: Language) -> u32 {
    match language {
        Language::JavaScript => 63, // Node.js
        Language::Python => 71,
        Language::Java => 62,
        Language::Cpp => 54,
    }
}

/// Body of `POST /submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest<'a> {
    pub source_code: &'a str,
    pub language_id: u32,
}

impl<'a> From<&'a ExecutionRequest> for SubmissionRequest<'a> {
    fn from(request: &'a ExecutionRequest) -> Self {
        Self {
            source_code: &request.source_code,
            language_id: language_id(request.language),
        }
    }
}
