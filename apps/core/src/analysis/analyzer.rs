//! Concern Analyzer - Main orchestrator for the analysis module.
//!
//! Runs sentiment scoring and concern extraction over one input, then classifies
//! and scores each extracted concern.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use super::classifier::{ConcernClassifier, IntensityPolicy};
use super::entities::{EntityRecognizer, KeywordSpanRecognizer};
use super::extractor::ConcernExtractor;
use super::lexicon::{LexiconScorer, ValenceLexicon};
use super::report::AnalysisReport;
use super::sentiment::SentimentScorer;
use super::taxonomy::Taxonomy;
use crate::error::AppError;

/// Orchestrates sentiment, extraction and classification for a single input
#[derive(Clone)]
pub struct ConcernAnalyzer {
    sentiment: SentimentScorer,
    extractor: ConcernExtractor,
    classifier: ConcernClassifier,
}

impl ConcernAnalyzer {
    pub fn new(
        sentiment: SentimentScorer,
        extractor: ConcernExtractor,
        classifier: ConcernClassifier,
    ) -> Self {
        Self {
            sentiment,
            extractor,
            classifier,
        }
    }

    /// Wire an analyzer from collaborators
    pub fn from_parts(
        taxonomy: Arc<Taxonomy>,
        lexicon: Arc<dyn LexiconScorer>,
        recognizer: Arc<dyn EntityRecognizer>,
        concern_label: &str,
        policy: IntensityPolicy,
    ) -> Self {
        Self::new(
            SentimentScorer::new(lexicon),
            ConcernExtractor::new(recognizer, concern_label),
            ConcernClassifier::with_policy(taxonomy, policy),
        )
    }

    /// Analyzer using the embedded lexicon and the keyword span recognizer
    pub fn with_builtin_collaborators(
        taxonomy: Arc<Taxonomy>,
        concern_label: &str,
    ) -> Result<Self, AppError> {
        let recognizer = KeywordSpanRecognizer::from_taxonomy(&taxonomy, concern_label)?;
        Ok(Self::from_parts(
            taxonomy,
            Arc::new(ValenceLexicon::embedded()?),
            Arc::new(recognizer),
            concern_label,
            IntensityPolicy::default(),
        ))
    }

    pub fn classifier(&self) -> &ConcernClassifier {
        &self.classifier
    }

    /// Analyze one input. The text is trimmed first.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn analyze(&self, text: &str) -> Result<AnalysisReport, AppError> {
        let start = Instant::now();
        let text = text.trim();

        let sentiment = self.sentiment.score(text)?;
        let assessments = self
            .extractor
            .extract(text)?
            .iter()
            .map(|concern| self.classifier.assess(concern))
            .collect();

        let report = AnalysisReport {
            text: text.to_string(),
            sentiment,
            assessments,
        };

        debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            "{}",
            report.summary()
        );
        Ok(report)
    }
}
