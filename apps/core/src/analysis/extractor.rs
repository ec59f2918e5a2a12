//! Concern Extractor.
//!
//! Maps the recognizer's concern-labelled spans back to substrings of the input.

use std::sync::Arc;

use super::entities::{EntityRecognizer, EntitySpan};
use crate::error::AppError;

/// Extracts concern phrases using an entity recognizer
#[derive(Clone)]
pub struct ConcernExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    concern_label: String,
}

impl ConcernExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, concern_label: impl Into<String>) -> Self {
        Self {
            recognizer,
            concern_label: concern_label.into(),
        }
    }

    pub fn concern_label(&self) -> &str {
        &self.concern_label
    }

    /// Concern phrases in span order.
    ///
    /// Spans with other labels are ignored. No dedup, no sorting. A span that does
    /// not fit inside `text` is a recognizer contract violation.
    pub fn extract(&self, text: &str) -> Result<Vec<String>, AppError> {
        let spans = self.recognizer.recognize(text)?;

        spans
            .iter()
            .filter(|span| span.label == self.concern_label)
            .map(|span| slice_chars(text, span))
            .collect()
    }
}

/// Slice `text` by a character-offset span
fn slice_chars(text: &str, span: &EntitySpan) -> Result<String, AppError> {
    if span.start > span.end {
        return Err(AppError::Recognizer(format!(
            "Span start {} is after end {}",
            span.start, span.end
        )));
    }

    let byte_offset = |char_index: usize| -> Option<usize> {
        text.char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .nth(char_index)
    };

    match (byte_offset(span.start), byte_offset(span.end)) {
        (Some(start), Some(end)) => Ok(text[start..end].to_string()),
        _ => Err(AppError::Recognizer(format!(
            "Span {}..{} is outside text of {} characters",
            span.start,
            span.end,
            text.chars().count()
        ))),
    }
}
