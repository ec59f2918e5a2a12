//! Entity recognition collaborator.
//!
//! The extractor treats recognition as an opaque capability: text in, ordered
//! `(start, end, label)` spans out. `KeywordSpanRecognizer` is the built-in rule
//! engine that tags every taxonomy term found in the text.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::taxonomy::Taxonomy;
use crate::error::AppError;

/// Label used for concern spans unless configured otherwise
pub const DEFAULT_CONCERN_LABEL: &str = "MENTAL_HEALTH_CONCERN";

/// A labeled span in character offsets (`end` is exclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// Capability interface for a named-entity recognizer.
///
/// Implementations return non-overlapping spans in ascending start order.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, AppError>;
}

/// Rule-based recognizer matching taxonomy terms as whole words
pub struct KeywordSpanRecognizer {
    pattern: Regex,
    label: String,
}

impl KeywordSpanRecognizer {
    /// Build a recognizer over every keyword and intensity key of the taxonomy
    pub fn from_taxonomy(taxonomy: &Taxonomy, label: impl Into<String>) -> Result<Self, AppError> {
        Self::from_terms(taxonomy.all_terms(), label)
    }

    /// Build a recognizer over an explicit term list
    pub fn from_terms<I, S>(terms: I, label: impl Into<String>) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Err(AppError::Config("Recognizer needs at least one term".to_string()));
        }

        // Longest first so the leftmost match at a position is also the longest
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        terms.dedup();

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;

        Ok(Self {
            pattern,
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl EntityRecognizer for KeywordSpanRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, AppError> {
        let mut spans = Vec::new();
        let mut byte_cursor = 0;
        let mut char_cursor = 0;

        for m in self.pattern.find_iter(text) {
            char_cursor += text[byte_cursor..m.start()].chars().count();
            let start = char_cursor;
            char_cursor += m.as_str().chars().count();
            byte_cursor = m.end();

            spans.push(EntitySpan::new(start, char_cursor, self.label.clone()));
        }

        Ok(spans)
    }
}
