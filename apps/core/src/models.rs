use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::timeline::TimelineEntry;

/// Represents a timeline entry as mirrored into durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EntryRecord {
    /// The entry's unique identifier (UUID).
    pub id: String,
    /// The user the entry was recorded for.
    pub user_id: String,
    /// The processed input text.
    pub text: String,
    /// Sentiment label ("Positive", "Neutral" or "Negative").
    pub sentiment: String,
    /// Concern phrases in extraction order.
    pub concerns: Json<Vec<String>>,
    /// Concern phrase -> category, in extraction order.
    pub categories: Json<IndexMap<String, String>>,
    /// Concern phrase -> intensity, in extraction order.
    pub intensities: Json<IndexMap<String, f64>>,
    /// Unix timestamp in milliseconds of when the entry was appended.
    pub created_at: i64,
}

impl From<&TimelineEntry> for EntryRecord {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            user_id: entry.user_id.clone(),
            text: entry.text.clone(),
            sentiment: entry.sentiment.label.to_string(),
            concerns: Json(entry.concerns().into_iter().map(str::to_string).collect()),
            categories: Json(
                entry
                    .categories()
                    .into_iter()
                    .map(|(concern, category)| (concern.to_string(), category.to_string()))
                    .collect(),
            ),
            intensities: Json(
                entry
                    .intensities()
                    .into_iter()
                    .map(|(concern, intensity)| (concern.to_string(), intensity as f64))
                    .collect(),
            ),
            created_at: entry.timestamp.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ConcernAssessment, SentimentLabel, SentimentResult};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_record_from_entry() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let entry = TimelineEntry {
            id: Uuid::new_v4(),
            user_id: "1".to_string(),
            text: "I feel anxious and can't sleep".to_string(),
            sentiment: SentimentResult {
                label: SentimentLabel::Negative,
                compound: -0.25,
                keywords: vec!["anxious".to_string()],
            },
            assessments: vec![
                ConcernAssessment {
                    phrase: "anxious".to_string(),
                    category: "Anxiety".to_string(),
                    intensity: 8,
                },
                ConcernAssessment {
                    phrase: "can't sleep".to_string(),
                    category: "Insomnia".to_string(),
                    intensity: 7,
                },
            ],
            timestamp,
        };

        let record = EntryRecord::from(&entry);

        assert_eq!(record.id, entry.id.to_string());
        assert_eq!(record.sentiment, "Negative");
        assert_eq!(record.concerns.0, vec!["anxious", "can't sleep"]);
        assert_eq!(record.categories.0["can't sleep"], "Insomnia");
        assert_eq!(record.intensities.0["anxious"], 8.0);
        assert_eq!(record.created_at, timestamp.timestamp_millis());
    }

    #[test]
    fn test_record_maps_keep_extraction_order() {
        let entry = TimelineEntry {
            id: Uuid::new_v4(),
            user_id: "1".to_string(),
            text: "sad and anxious".to_string(),
            sentiment: SentimentResult::neutral(),
            assessments: vec![
                ConcernAssessment {
                    phrase: "sad".to_string(),
                    category: "Depression".to_string(),
                    intensity: 7,
                },
                ConcernAssessment {
                    phrase: "anxious".to_string(),
                    category: "Anxiety".to_string(),
                    intensity: 8,
                },
            ],
            timestamp: Utc::now(),
        };

        let record = EntryRecord::from(&entry);
        assert_eq!(record.categories.0.keys().collect::<Vec<_>>(), vec!["sad", "anxious"]);

        let json = serde_json::to_string(&record.intensities).unwrap();
        assert_eq!(json, r#"{"sad":7.0,"anxious":8.0}"#);
    }
}
