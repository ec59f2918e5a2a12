//! Sentiment Scorer.
//!
//! Labels a sentence Positive / Neutral / Negative from the lexicon compound score
//! and collects the individual tokens that carry polarity.

use std::sync::Arc;

use super::lexicon::LexiconScorer;
use super::report::{SentimentLabel, SentimentResult};
use crate::error::AppError;

/// Sentence-level polarity classifier over a lexicon collaborator
#[derive(Clone)]
pub struct SentimentScorer {
    lexicon: Arc<dyn LexiconScorer>,
}

impl SentimentScorer {
    pub fn new(lexicon: Arc<dyn LexiconScorer>) -> Self {
        Self { lexicon }
    }

    /// Score a sentence.
    ///
    /// Blank input is Neutral with no keywords. Lexicon failures are propagated as-is.
    pub fn score(&self, text: &str) -> Result<SentimentResult, AppError> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::neutral());
        }

        let compound = self.lexicon.polarity(text)?.compound;

        let mut keywords = Vec::new();
        for token in text.split_whitespace() {
            if self.lexicon.polarity(token)?.compound != 0.0 {
                keywords.push(token.to_string());
            }
        }

        Ok(SentimentResult {
            label: SentimentLabel::from_compound(compound),
            compound,
            keywords,
        })
    }
}
