//! Concern Classifier & Intensity Scorer.
//!
//! Keyword-substring classification against the taxonomy. First declared category
//! wins on ties. Intensity is the max severity over every category's table by
//! default, independently of the classified category.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::report::{ConcernAssessment, OTHER_CATEGORY};
use super::taxonomy::{Taxonomy, MIN_SEVERITY};
use crate::error::AppError;

/// How a phrase's intensity relates to its classified category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityPolicy {
    /// Max over every category's table, even categories the phrase was not classified into
    #[default]
    CrossCategory,
    /// Max over the classified category's own table only
    MatchedCategory,
}

impl FromStr for IntensityPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cross_category" => Ok(IntensityPolicy::CrossCategory),
            "matched_category" => Ok(IntensityPolicy::MatchedCategory),
            other => Err(AppError::Config(format!(
                "Unknown intensity policy '{}'",
                other
            ))),
        }
    }
}

/// Classifies concern phrases and scores their severity
#[derive(Debug, Clone)]
pub struct ConcernClassifier {
    taxonomy: Arc<Taxonomy>,
    policy: IntensityPolicy,
}

impl ConcernClassifier {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self::with_policy(taxonomy, IntensityPolicy::default())
    }

    pub fn with_policy(taxonomy: Arc<Taxonomy>, policy: IntensityPolicy) -> Self {
        Self { taxonomy, policy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn policy(&self) -> IntensityPolicy {
        self.policy
    }

    /// Name of the first category (declaration order) with a keyword inside the phrase,
    /// or `"Other"`
    pub fn classify(&self, phrase: &str) -> String {
        let lower = phrase.to_lowercase();
        self.taxonomy
            .categories()
            .iter()
            .find(|category| category.matches(&lower))
            .map(|category| category.name().to_string())
            .unwrap_or_else(|| OTHER_CATEGORY.to_string())
    }

    /// Max severity among every intensity key, from any category, found inside the
    /// phrase. Never below 1.
    pub fn score_intensity(&self, phrase: &str) -> u8 {
        let lower = phrase.to_lowercase();
        self.taxonomy
            .categories()
            .iter()
            .filter_map(|category| category.max_intensity(&lower))
            .max()
            .unwrap_or(MIN_SEVERITY)
    }

    /// Max severity restricted to `category`'s own table. Never below 1.
    pub fn score_intensity_within(&self, phrase: &str, category: &str) -> u8 {
        let lower = phrase.to_lowercase();
        self.taxonomy
            .get(category)
            .and_then(|c| c.max_intensity(&lower))
            .unwrap_or(MIN_SEVERITY)
    }

    /// Intensity under the configured policy, given an already computed category
    pub fn intensity(&self, phrase: &str, category: &str) -> u8 {
        match self.policy {
            IntensityPolicy::CrossCategory => self.score_intensity(phrase),
            IntensityPolicy::MatchedCategory => self.score_intensity_within(phrase, category),
        }
    }

    /// Classify and score one phrase
    pub fn assess(&self, phrase: &str) -> ConcernAssessment {
        let category = self.classify(phrase);
        let intensity = self.intensity(phrase, &category);
        ConcernAssessment {
            phrase: phrase.to_string(),
            category,
            intensity,
        }
    }
}
