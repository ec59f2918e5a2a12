//! Analysis Report - Output structures for concern analysis.
//!
//! Contains the sentiment signal and per-concern assessments extracted from one input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category returned when no taxonomy keyword matches a phrase.
pub const OTHER_CATEGORY: &str = "Other";

/// Polarity label derived from the compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Compound score at or above which text is positive
    pub const POSITIVE_THRESHOLD: f64 = 0.05;
    /// Compound score at or below which text is negative
    pub const NEGATIVE_THRESHOLD: f64 = -0.05;

    /// Classify a compound polarity score
    pub fn from_compound(compound: f64) -> Self {
        if compound >= Self::POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= Self::NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of sentiment scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Polarity label
    pub label: SentimentLabel,
    /// Compound score of the whole text (-1.0 - 1.0)
    pub compound: f64,
    /// Tokens with non-zero polarity, in input order, duplicates kept
    pub keywords: Vec<String>,
}

impl SentimentResult {
    /// Neutral result with no keywords (used for blank input)
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            compound: 0.0,
            keywords: vec![],
        }
    }
}

/// Category and severity assigned to one extracted concern phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcernAssessment {
    /// Concern phrase as it appeared in the text
    pub phrase: String,
    /// Taxonomy category name, or `"Other"`
    pub category: String,
    /// Severity (1 - 10)
    pub intensity: u8,
}

impl ConcernAssessment {
    pub fn is_uncategorized(&self) -> bool {
        self.category == OTHER_CATEGORY
    }
}

/// Complete analysis of one input, before it is placed on the timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Trimmed input text
    pub text: String,
    /// Sentiment signal
    pub sentiment: SentimentResult,
    /// Assessments in extraction order
    pub assessments: Vec<ConcernAssessment>,
}

impl AnalysisReport {
    /// Concern phrases in extraction order
    pub fn concerns(&self) -> Vec<&str> {
        self.assessments.iter().map(|a| a.phrase.as_str()).collect()
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Sentiment: {} ({:.2}), Concerns: {}, Max intensity: {}",
            self.sentiment.label,
            self.sentiment.compound,
            self.assessments.len(),
            self.assessments
                .iter()
                .map(|a| a.intensity)
                .max()
                .unwrap_or(0)
        )
    }
}
