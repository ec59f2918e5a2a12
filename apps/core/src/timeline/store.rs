//! Timeline Store.
//!
//! Append-only, process-wide log of scored entries. The only mutable shared state in
//! the core: appends take the write lock for timestamp assignment and placement
//! together, reads take the read lock and copy out `Arc` handles, so readers never
//! see a partially built entry.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use crate::analysis::{AnalysisReport, ConcernAssessment, SentimentResult};

/// Reported as the dominant concern when the latest entry has no concerns
pub const NO_CONCERN_DOMINANT: &str = "Neutral";

/// One fully scored input. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub sentiment: SentimentResult,
    /// Extraction order, duplicates allowed
    pub assessments: Vec<ConcernAssessment>,
    /// Assigned by the store at append time
    pub timestamp: DateTime<Utc>,
}

impl TimelineEntry {
    /// Concern phrases in extraction order
    pub fn concerns(&self) -> Vec<&str> {
        self.assessments.iter().map(|a| a.phrase.as_str()).collect()
    }

    /// Concern -> category, one pair per distinct phrase
    pub fn categories(&self) -> Vec<(&str, &str)> {
        keyed_by_phrase(&self.assessments, |a| a.category.as_str())
    }

    /// Concern -> intensity, one pair per distinct phrase
    pub fn intensities(&self) -> Vec<(&str, u8)> {
        keyed_by_phrase(&self.assessments, |a| a.intensity)
    }

    /// Concern with the highest intensity; the first one wins a tie
    pub fn dominant_concern(&self) -> Option<&str> {
        let mut best: Option<(&str, u8)> = None;
        for (phrase, intensity) in self.intensities() {
            if best.map_or(true, |(_, top)| intensity > top) {
                best = Some((phrase, intensity));
            }
        }
        best.map(|(phrase, _)| phrase)
    }
}

/// Collapse repeated phrases the way a keyed map would: the key keeps its first
/// position, the value comes from the last occurrence.
fn keyed_by_phrase<'a, V>(
    assessments: &'a [ConcernAssessment],
    value: impl Fn(&'a ConcernAssessment) -> V,
) -> Vec<(&'a str, V)> {
    let mut pairs: Vec<(&'a str, V)> = Vec::with_capacity(assessments.len());
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for assessment in assessments {
        let phrase = assessment.phrase.as_str();
        match positions.get(phrase) {
            Some(&index) => pairs[index].1 = value(assessment),
            None => {
                positions.insert(phrase, pairs.len());
                pairs.push((phrase, value(assessment)));
            }
        }
    }

    pairs
}

#[derive(Default)]
struct TimelineInner {
    entries: Vec<Arc<TimelineEntry>>,
    by_user: HashMap<String, Vec<usize>>,
}

/// Shared append-only timeline
pub struct TimelineStore {
    inner: RwLock<TimelineInner>,
    clock: Arc<dyn Clock>,
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineStore {
    /// Empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(TimelineInner::default()),
            clock,
        }
    }

    /// Current time on the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Append a scored input, stamping it with the current time.
    ///
    /// If the clock reads earlier than the last entry, the last entry's timestamp is
    /// reused so the log stays ordered.
    #[instrument(skip_all)]
    pub fn append(
        &self,
        user_id: impl AsRef<str>,
        text: impl Into<String>,
        sentiment: SentimentResult,
        assessments: Vec<ConcernAssessment>,
    ) -> Arc<TimelineEntry> {
        let user_id = user_id.as_ref().to_string();
        let mut inner = self.inner.write();

        let mut timestamp = self.clock.now();
        if let Some(last) = inner.entries.last() {
            timestamp = timestamp.max(last.timestamp);
        }

        let entry = Arc::new(TimelineEntry {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            text: text.into(),
            sentiment,
            assessments,
            timestamp,
        });

        let index = inner.entries.len();
        inner.entries.push(Arc::clone(&entry));
        inner.by_user.entry(user_id).or_default().push(index);

        debug!(
            entry_id = %entry.id,
            user_id = %entry.user_id,
            concerns = entry.assessments.len(),
            "Appended timeline entry"
        );
        entry
    }

    /// Append the output of the analyzer
    pub fn append_report(&self, user_id: impl AsRef<str>, report: AnalysisReport) -> Arc<TimelineEntry> {
        self.append(user_id, report.text, report.sentiment, report.assessments)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Consistent copy of the whole log
    pub fn snapshot(&self) -> Vec<Arc<TimelineEntry>> {
        self.inner.read().entries.clone()
    }

    /// Entries with `timestamp >= start`, ascending
    pub fn entries_since(&self, start: DateTime<Utc>) -> Vec<Arc<TimelineEntry>> {
        let inner = self.inner.read();
        let first = inner.entries.partition_point(|e| e.timestamp < start);
        inner.entries[first..].to_vec()
    }

    /// Entries appended for one user, ascending
    pub fn entries_for_user(&self, user_id: &str) -> Vec<Arc<TimelineEntry>> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(user_id)
            .map(|indices| indices.iter().map(|&i| Arc::clone(&inner.entries[i])).collect())
            .unwrap_or_default()
    }

    /// Most recent entry across all users
    pub fn last_entry(&self) -> Option<Arc<TimelineEntry>> {
        self.inner.read().entries.last().cloned()
    }

    /// Dominant concern of the most recent entry in the whole log.
    ///
    /// `user_id` does not narrow the lookup: the log is read as a single global
    /// stream. See `last_dominant_concern_for_user` for the per-user variant.
    /// `None` only when the log is empty; an entry without concerns reads as
    /// `NO_CONCERN_DOMINANT`.
    pub fn last_dominant_concern(&self, _user_id: &str) -> Option<String> {
        self.last_entry().map(|entry| dominant_or_neutral(&entry))
    }

    /// Dominant concern of the most recent entry appended for `user_id`.
    /// `None` when the user has no entries.
    pub fn last_dominant_concern_for_user(&self, user_id: &str) -> Option<String> {
        let inner = self.inner.read();
        let index = *inner.by_user.get(user_id)?.last()?;
        Some(dominant_or_neutral(&inner.entries[index]))
    }
}

fn dominant_or_neutral(entry: &TimelineEntry) -> String {
    entry
        .dominant_concern()
        .unwrap_or(NO_CONCERN_DOMINANT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn assessment(phrase: &str, category: &str, intensity: u8) -> ConcernAssessment {
        ConcernAssessment {
            phrase: phrase.to_string(),
            category: category.to_string(),
            intensity,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_append_assigns_clock_time() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = TimelineStore::with_clock(clock.clone());

        let entry = store.append("1", "hello", SentimentResult::neutral(), vec![]);
        assert_eq!(entry.timestamp, start());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = TimelineStore::with_clock(clock.clone());

        store.append("1", "a", SentimentResult::neutral(), vec![]);
        clock.set(start() - Duration::minutes(5));
        let second = store.append("1", "b", SentimentResult::neutral(), vec![]);

        assert_eq!(second.timestamp, start());
    }

    #[test]
    fn test_intensities_use_map_semantics() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = TimelineStore::with_clock(clock);
        let entry = store.append(
            "1",
            "sad, tense, sad",
            SentimentResult::neutral(),
            vec![
                assessment("sad", "Depression", 7),
                assessment("tense", "Anxiety", 5),
                assessment("sad", "Depression", 3),
            ],
        );

        assert_eq!(entry.concerns(), vec!["sad", "tense", "sad"]);
        assert_eq!(entry.intensities(), vec![("sad", 3), ("tense", 5)]);
        assert_eq!(
            entry.categories(),
            vec![("sad", "Depression"), ("tense", "Anxiety")]
        );
    }

    #[test]
    fn test_dominant_concern_first_wins_ties() {
        let store = TimelineStore::new();
        store.append(
            "1",
            "x",
            SentimentResult::neutral(),
            vec![
                assessment("tense", "Anxiety", 5),
                assessment("panic", "Anxiety", 9),
                assessment("trauma", "PTSD", 9),
            ],
        );

        assert_eq!(store.last_dominant_concern("1"), Some("panic".to_string()));
    }

    #[test]
    fn test_last_dominant_concern_is_global() {
        let store = TimelineStore::new();
        store.append("alice", "a", SentimentResult::neutral(), vec![assessment("sad", "Depression", 7)]);
        store.append("bob", "b", SentimentResult::neutral(), vec![assessment("tense", "Anxiety", 5)]);

        assert_eq!(store.last_dominant_concern("alice"), Some("tense".to_string()));
        assert_eq!(
            store.last_dominant_concern_for_user("alice"),
            Some("sad".to_string())
        );
        assert_eq!(store.last_dominant_concern_for_user("carol"), None);
    }

    #[test]
    fn test_last_dominant_concern_empty() {
        let store = TimelineStore::new();
        assert_eq!(store.last_dominant_concern("1"), None);

        store.append("1", "nothing", SentimentResult::neutral(), vec![]);
        assert_eq!(
            store.last_dominant_concern("1").as_deref(),
            Some(NO_CONCERN_DOMINANT)
        );
        assert_eq!(
            store.last_dominant_concern_for_user("1").as_deref(),
            Some("Neutral")
        );
    }

    #[test]
    fn test_entries_since_boundary_is_inclusive() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = TimelineStore::with_clock(clock.clone());

        store.append("1", "a", SentimentResult::neutral(), vec![]);
        clock.advance(Duration::hours(1));
        store.append("1", "b", SentimentResult::neutral(), vec![]);

        let since = store.entries_since(start() + Duration::hours(1));
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].text, "b");

        assert_eq!(store.entries_since(start()).len(), 2);
    }

    #[test]
    fn test_entries_for_user() {
        let store = TimelineStore::new();
        store.append("alice", "a1", SentimentResult::neutral(), vec![]);
        store.append("bob", "b1", SentimentResult::neutral(), vec![]);
        store.append("alice", "a2", SentimentResult::neutral(), vec![]);

        let texts: Vec<String> = store
            .entries_for_user("alice")
            .iter()
            .map(|e| e.text.clone())
            .collect();
        assert_eq!(texts, vec!["a1", "a2"]);
        assert!(store.entries_for_user("nobody").is_empty());
    }
}
