//! Judge0 submission API.

mod client;
mod protocol;

pub use client::{DEFAULT_BASE_URL, DEFAULT_RAPIDAPI_HOST, Judge0Client, Judge0Config};
pub use protocol::{SubmissionRequest, language_id};
