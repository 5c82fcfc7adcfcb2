//! Keyword-based command classification

use gatehouse_types::Command;
use tracing::warn;

use crate::error::GatehouseError;

/// Keywords matched against the default destructive-operation list
pub const DEFAULT_RESTRICTED_KEYWORDS: &[&str] = &["DROP", "DELETE", "TRUNCATE"];

/// Keywords that require the admin role
pub const DEFAULT_PRIVILEGED_KEYWORDS: &[&str] = &["CREATE", "DROP", "ALTER", "GRANT", "REVOKE"];

/// Ordered, case-insensitive substring matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    // Stored upper-cased, in the order they were configured
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// First configured keyword contained in the command, if any
    pub fn first_match(&self, command: &Command) -> Option<&str> {
        let normalized = command.normalized();
        self.keywords
            .iter()
            .find(|keyword| normalized.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, command: &Command) -> bool {
        self.first_match(command).is_some()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { keyword: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Convert into the error returned to callers, if denied
    pub fn into_result(self) -> Result<(), GatehouseError> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied { keyword } => Err(GatehouseError::AccessDenied { keyword }),
        }
    }
}

/// Rejects commands containing any restricted keyword
///
/// Pure: the decision depends only on the command and the configured list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    restricted: KeywordMatcher,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESTRICTED_KEYWORDS)
    }
}

impl AccessPolicy {
    pub fn new<I, S>(restricted_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            restricted: KeywordMatcher::new(restricted_keywords),
        }
    }

    /// A policy that allows everything
    pub fn allow_all() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn check(&self, command: &Command) -> Decision {
        match self.restricted.first_match(command) {
            Some(keyword) => {
                warn!(keyword, command = %command.preview(30), "restricted operation detected");
                Decision::Denied {
                    keyword: keyword.to_string(),
                }
            }
            None => Decision::Allowed,
        }
    }
}
