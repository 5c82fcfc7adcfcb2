//! Command types

use serde::{Deserialize, Serialize};

/// A requested operation, issued once and never modified afterwards.
///
/// Commands are compared by exact text, so `"SELECT 1"` and `"select 1"`
/// are different cache keys even though keyword classification treats
/// them alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased copy used for keyword classification
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }

    /// Whether the command contains `keyword`, ignoring case
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.normalized().contains(&keyword.to_uppercase())
    }

    /// First `max_chars` characters, for log lines
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
