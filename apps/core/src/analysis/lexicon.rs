//! Valence lexicon scoring.
//!
//! Rule-based polarity scoring over a word -> valence table, in the style of
//! VADER: negation flips, booster words, exclamation emphasis and a normalized
//! compound score in [-1, 1].

use std::collections::HashMap;
use std::path::Path;

use crate::error::AppError;

/// Lexicon shipped with the binary
const EMBEDDED_LEXICON: &str = include_str!("../../data/valence_lexicon.tsv");

/// Scale applied to a valence that follows a negation
const NEGATION_SCALAR: f64 = -0.74;
/// Increment from a booster word
const BOOSTER_INCREMENT: f64 = 0.293;
/// Increment per exclamation mark
const EXCLAMATION_INCREMENT: f64 = 0.292;
/// Exclamation marks counted at most
const MAX_EXCLAMATIONS: usize = 4;
/// Normalization constant for the compound score
const NORMALIZATION_ALPHA: f64 = 15.0;
/// How many preceding tokens are checked for negation
const NEGATION_WINDOW: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "cant", "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't",
    "wasnt", "wasn't", "wont", "won't", "aint", "ain't", "without", "hardly",
];

const BOOSTERS: &[&str] = &[
    "absolutely", "completely", "deeply", "extremely", "incredibly", "really", "so", "terribly",
    "totally", "truly", "very", "super", "utterly", "especially", "particularly",
];

const DAMPENERS: &[&str] = &[
    "barely", "kinda", "kindof", "little", "marginally", "partly", "slightly", "somewhat",
    "sort", "sorta",
];

/// Scores produced by a lexicon collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScores {
    /// Normalized polarity (-1.0 - 1.0)
    pub compound: f64,
}

/// Capability interface for lexicon-based polarity scoring.
///
/// Usable on whole sentences or on single tokens.
pub trait LexiconScorer: Send + Sync {
    fn polarity(&self, text: &str) -> Result<PolarityScores, AppError>;
}

/// Word -> valence table with VADER-style heuristics
#[derive(Debug, Clone)]
pub struct ValenceLexicon {
    valences: HashMap<String, f64>,
}

impl ValenceLexicon {
    /// Load the lexicon embedded in the binary
    pub fn embedded() -> Result<Self, AppError> {
        Self::from_tsv(EMBEDDED_LEXICON)
    }

    /// Load a tab- or space-separated `word valence` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_tsv(&content)
    }

    /// Parse `word<TAB>valence` lines; blank lines and `#` comments are skipped
    pub fn from_tsv(content: &str) -> Result<Self, AppError> {
        let mut valences = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, value) = line.rsplit_once(|c: char| c.is_whitespace()).ok_or_else(|| {
                AppError::Lexicon(format!("Line {}: expected '<word> <valence>'", index + 1))
            })?;
            let valence: f64 = value.trim().parse().map_err(|_| {
                AppError::Lexicon(format!("Line {}: invalid valence '{}'", index + 1, value))
            })?;

            valences.insert(word.trim().to_lowercase(), valence);
        }

        if valences.is_empty() {
            return Err(AppError::Lexicon("Lexicon contains no entries".to_string()));
        }

        Ok(Self { valences })
    }

    /// Build a lexicon from explicit entries
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            valences: entries
                .into_iter()
                .map(|(w, v)| (w.as_ref().to_lowercase(), v))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    /// Raw valence for a single normalized word
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    fn normalize_token(token: &str) -> String {
        token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || token.ends_with("n't")
    }

    fn sentiment_sum(&self, tokens: &[String]) -> f64 {
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(mut valence) = self.valence(token) else {
                continue;
            };
            if valence == 0.0 {
                continue;
            }

            if let Some(previous) = i.checked_sub(1).map(|p| tokens[p].as_str()) {
                if BOOSTERS.contains(&previous) {
                    valence += BOOSTER_INCREMENT * valence.signum();
                } else if DAMPENERS.contains(&previous) {
                    valence -= BOOSTER_INCREMENT * valence.signum();
                }
            }

            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| Self::is_negation(t)) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        sum
    }
}

impl LexiconScorer for ValenceLexicon {
    fn polarity(&self, text: &str) -> Result<PolarityScores, AppError> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(Self::normalize_token)
            .filter(|t| !t.is_empty())
            .collect();

        let mut sum = self.sentiment_sum(&tokens);

        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += EXCLAMATION_INCREMENT * exclamations as f64 * sum.signum();
        }

        let compound = if sum == 0.0 {
            0.0
        } else {
            (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
        };

        Ok(PolarityScores { compound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> ValenceLexicon {
        ValenceLexicon::embedded().unwrap()
    }

    #[test]
    fn test_embedded_lexicon_loads() {
        let lexicon = lexicon();
        assert!(lexicon.len() > 100);
        assert_eq!(lexicon.valence("calm"), Some(1.3));
    }

    #[test]
    fn test_positive_sentence() {
        let scores = lexicon().polarity("I am calm and relaxed").unwrap();
        assert!(scores.compound > 0.05, "compound was {}", scores.compound);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let lexicon = lexicon();
        let plain = lexicon.polarity("I am happy").unwrap().compound;
        let negated = lexicon.polarity("I am not happy").unwrap().compound;

        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn test_booster_strengthens() {
        let lexicon = lexicon();
        let plain = lexicon.polarity("I feel sad").unwrap().compound;
        let boosted = lexicon.polarity("I feel very sad").unwrap().compound;

        assert!(boosted < plain);
    }

    #[test]
    fn test_exclamation_emphasis() {
        let lexicon = lexicon();
        let plain = lexicon.polarity("great").unwrap().compound;
        let excited = lexicon.polarity("great!!!").unwrap().compound;

        assert!(excited > plain);
    }

    #[test]
    fn test_unknown_words_are_zero() {
        let scores = lexicon().polarity("the table is wooden").unwrap();
        assert_eq!(scores.compound, 0.0);

        let blank = lexicon().polarity("   ").unwrap();
        assert_eq!(blank.compound, 0.0);
    }

    #[test]
    fn test_compound_is_bounded() {
        let text = "love love love love love love love love amazing wonderful!!!!!!";
        let scores = lexicon().polarity(text).unwrap();
        assert!(scores.compound <= 1.0 && scores.compound > 0.9);
    }

    #[test]
    fn test_malformed_lexicon_line() {
        let result = ValenceLexicon::from_tsv("happy\tvery\n");
        assert!(matches!(result, Err(AppError::Lexicon(_))));

        let empty = ValenceLexicon::from_tsv("# only a comment\n\n");
        assert!(matches!(empty, Err(AppError::Lexicon(_))));
    }
}
