//! Judge0 execution backend for collaborative code rooms.
//!
//! Provides:
//! - `Judge0Client` - `ExecutionBackend` over the Judge0 submissions API
//! - Language id mapping and request types

pub mod judge0;

pub use judge0::{Judge0Client, Judge0Config};
