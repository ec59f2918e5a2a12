//! # Analysis Module
//!
//! Non-generative analysis of free-text statements of emotional state.
//!
//! ## Components
//! - `lexicon`: Valence lexicon collaborator (polarity scoring)
//! - `sentiment`: Sentence sentiment label and polar keywords
//! - `taxonomy`: Versioned concern categories and severity tables
//! - `entities`: Entity recognizer collaborator and rule-based recognizer
//! - `extractor`: Concern phrase extraction from recognizer spans
//! - `classifier`: Category classification and intensity scoring
//! - `report`: Output data structures
//! - `analyzer`: Main orchestrator

pub mod analyzer;
pub mod classifier;
pub mod entities;
pub mod extractor;
pub mod lexicon;
pub mod report;
pub mod sentiment;
pub mod taxonomy;

pub use analyzer::ConcernAnalyzer;
pub use classifier::{ConcernClassifier, IntensityPolicy};
pub use entities::{EntityRecognizer, EntitySpan, KeywordSpanRecognizer, DEFAULT_CONCERN_LABEL};
pub use extractor::ConcernExtractor;
pub use lexicon::{LexiconScorer, PolarityScores, ValenceLexicon};
pub use report::{AnalysisReport, ConcernAssessment, SentimentLabel, SentimentResult, OTHER_CATEGORY};
pub use sentiment::SentimentScorer;
pub use taxonomy::{ConcernCategory, Taxonomy};
