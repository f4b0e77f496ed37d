//! Languages a room can hand to the execution service.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A language the execution service knows how to run.
///
/// The editor may switch to any language tag; only these can be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
}

impl Language {
    /// Every executable language, in display order.
    pub const ALL: [Self; 4] = [Self::JavaScript, Self::Python, Self::Java, Self::Cpp];

    /// Tag used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language tag that has no execution mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language: {0}")]
pub struct LanguageError(pub String);

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| LanguageError(s.to_string()))
    }
}
