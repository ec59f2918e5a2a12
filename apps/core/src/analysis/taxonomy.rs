//! Concern Category Taxonomy.
//!
//! Static, versioned mapping of categories to keyword sets and keyword severity tables.
//! Loaded once at startup from the embedded JSON document or from a file, then shared
//! read-only. Declaration order is significant: classification is first-match.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use super::report::OTHER_CATEGORY;
use crate::error::AppError;

/// Taxonomy shipped with the binary
const EMBEDDED_TAXONOMY: &str = include_str!("../../data/taxonomy.json");

/// Lowest valid severity
pub const MIN_SEVERITY: u8 = 1;
/// Highest valid severity
pub const MAX_SEVERITY: u8 = 10;

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    version: String,
    categories: Vec<CategoryDocument>,
}

#[derive(Debug, Deserialize)]
struct CategoryDocument {
    name: String,
    keywords: Vec<String>,
    #[serde(default)]
    intensity: BTreeMap<String, i64>,
}

/// One taxonomy bucket. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcernCategory {
    name: String,
    /// Lowercased, de-duplicated, declaration order
    keywords: Vec<String>,
    /// Lowercased keyword -> severity
    intensity_table: BTreeMap<String, u8>,
}

impl ConcernCategory {
    /// Build a category, normalizing keywords to lowercase.
    ///
    /// Severities outside [1, 10] are rejected.
    pub fn new<K, I, S>(name: impl Into<String>, keywords: K, intensity: I) -> Result<Self, AppError>
    where
        K: IntoIterator<Item = S>,
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Config("Category name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let mut intensity_table = BTreeMap::new();
        for (keyword, severity) in intensity {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            if !(MIN_SEVERITY as i64..=MAX_SEVERITY as i64).contains(&severity) {
                return Err(AppError::Config(format!(
                    "Severity {} for '{}' in category '{}' is outside {}..={}",
                    severity, keyword, name, MIN_SEVERITY, MAX_SEVERITY
                )));
            }
            let severity = severity as u8;
            intensity_table
                .entry(keyword)
                .and_modify(|s: &mut u8| *s = (*s).max(severity))
                .or_insert(severity);
        }

        Ok(Self {
            name,
            keywords,
            intensity_table,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn intensity_table(&self) -> &BTreeMap<String, u8> {
        &self.intensity_table
    }

    /// True if any keyword is a substring of the already-lowercased phrase
    pub fn matches(&self, phrase_lower: &str) -> bool {
        self.keywords.iter().any(|k| phrase_lower.contains(k.as_str()))
    }

    /// Highest severity among intensity keys contained in the already-lowercased phrase
    pub fn max_intensity(&self, phrase_lower: &str) -> Option<u8> {
        self.intensity_table
            .iter()
            .filter(|(keyword, _)| phrase_lower.contains(keyword.as_str()))
            .map(|(_, &severity)| severity)
            .max()
    }
}

/// Ordered, versioned set of concern categories
#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: String,
    categories: Vec<ConcernCategory>,
}

impl Taxonomy {
    /// Build a taxonomy from already-constructed categories
    pub fn new(version: impl Into<String>, categories: Vec<ConcernCategory>) -> Result<Self, AppError> {
        if categories.is_empty() {
            return Err(AppError::Config("Taxonomy has no categories".to_string()));
        }

        let mut names = HashSet::new();
        for category in &categories {
            if category.name().eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(AppError::Config(format!(
                    "'{}' is reserved for unmatched concerns",
                    OTHER_CATEGORY
                )));
            }
            if !names.insert(category.name().to_string()) {
                return Err(AppError::Config(format!(
                    "Duplicate category '{}'",
                    category.name()
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            categories,
        })
    }

    /// Load the taxonomy embedded in the binary
    pub fn embedded() -> Result<Self, AppError> {
        Self::from_json(EMBEDDED_TAXONOMY)
    }

    /// Parse a taxonomy JSON document
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let document: TaxonomyDocument = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid taxonomy document: {}", e)))?;

        let categories = document
            .categories
            .into_iter()
            .map(|c| ConcernCategory::new(c.name, c.keywords, c.intensity))
            .collect::<Result<Vec<_>, _>>()?;

        let taxonomy = Self::new(document.version, categories)?;
        info!(
            version = %taxonomy.version,
            categories = taxonomy.categories.len(),
            "Loaded concern taxonomy"
        );
        Ok(taxonomy)
    }

    /// Load a taxonomy JSON document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Categories in declaration order
    pub fn categories(&self) -> &[ConcernCategory] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&ConcernCategory> {
        self.categories.iter().find(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every keyword and intensity key across all categories, de-duplicated
    pub fn all_terms(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .flat_map(|c| c.keywords.iter().chain(c.intensity_table.keys()))
            .filter(|term| seen.insert(term.to_string()))
            .cloned()
            .collect()
    }
}
