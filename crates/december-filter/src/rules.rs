use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in disallowed words, matched as substrings of the stripped text.
const DEFAULT_WORDS: &[&str] = &[
    "anjng", "anjing", "anjg", "uaso", "asu", "bab1", "babi", "bgst", "bangsat",
    "kntl", "kontol", "memek", "mmk", "jembut", "jmbut", "peler", "peju", "ngentot", "ngewe",
    "lonte", "lont3", "perek", "pecun", "bencong", "banci", "jablay", "maho",
    "fuck", "fck", "shit", "bitch", "btch", "asshole", "dick", "cock", "pussy",
    "cunt", "whore", "slut", "nigger", "nigga", "faggot",
];

/// Built-in patterns for disguise-prone words, matched case-insensitively
/// against the normalized (not stripped) text.
const DEFAULT_PATTERNS: &[&str] = &[
    r"k[aou]*n+t[aou]*l",
    r"m[e3]*m[e3]*k",
    r"n+g+[e3]w+[e3]",
    r"b[o0]k[e3]p",
    r"f[u4a]*c+k",
];

#[derive(Debug, Error)]
pub enum FilterRulesError {
    #[error("failed to read filter rules: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed filter rules: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Word list and pattern set driving [`crate::ProfanityFilter`].
///
/// This is configuration data: operators can replace it with a JSON document
/// of the same shape without touching the matching logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRules {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FilterRules {
    pub fn from_json(json: &str) -> Result<Self, FilterRulesError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, FilterRulesError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Words that can never match because normalization rewrites them
    /// (digits, doubled letters, non-letters). Reported at startup so an
    /// operator can fix the list.
    pub fn unreachable_words(&self) -> Vec<&str> {
        self.words
            .iter()
            .map(String::as_str)
            .filter(|w| {
                let normalized = crate::profanity::normalize(w);
                crate::profanity::strip(&normalized) != *w
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_populated() {
        let rules = FilterRules::default();
        assert!(rules.words.contains(&"kontol".to_string()));
        assert_eq!(rules.patterns.len(), 5);
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let rules = FilterRules::from_json(r#"{"words": ["salju"]}"#).unwrap();
        assert_eq!(rules.words, vec!["salju"]);
        assert!(rules.patterns.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = FilterRules::from_json("{words:").unwrap_err();
        assert!(matches!(err, FilterRulesError::Json(_)));
    }

    #[test]
    fn flags_words_that_normalization_rewrites() {
        let rules = FilterRules::default();
        let unreachable = rules.unreachable_words();
        assert!(unreachable.contains(&"bab1"));
        assert!(unreachable.contains(&"lont3"));
        assert!(unreachable.contains(&"asshole"));
        assert!(!unreachable.contains(&"kontol"));
    }
}
