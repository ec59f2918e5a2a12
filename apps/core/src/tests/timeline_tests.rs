//! Timeline Module Tests
//!
//! Ordering, timeframe windows and aggregation over a clock-controlled store.

use crate::analysis::{ConcernAssessment, SentimentResult};
use crate::timeline::{
    ManualClock, SeriesKey, TimeframeAggregator, TimelineStore, NO_CONCERN_DOMINANT,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
}

fn clocked_store() -> (Arc<ManualClock>, Arc<TimelineStore>) {
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(TimelineStore::with_clock(clock.clone()));
    (clock, store)
}

fn assessment(phrase: &str, category: &str, intensity: u8) -> ConcernAssessment {
    ConcernAssessment {
        phrase: phrase.to_string(),
        category: category.to_string(),
        intensity,
    }
}

mod aggregation {
    use super::*;

    #[test]
    fn test_stressed_series_in_order() {
        let (clock, store) = clocked_store();
        let mut stamps = Vec::new();
        for intensity in [5, 7, 9] {
            let entry = store.append(
                "1",
                "stressed",
                SentimentResult::neutral(),
                vec![assessment("stressed", "Stress", intensity)],
            );
            stamps.push(entry.timestamp);
            clock.advance(Duration::hours(2));
        }

        let series = TimeframeAggregator::new(store).aggregate("daily").unwrap();

        let points: Vec<_> = series
            .get("stressed")
            .unwrap()
            .iter()
            .map(|p| (p.timestamp, p.intensity))
            .collect();
        assert_eq!(
            points,
            vec![(stamps[0], 5), (stamps[1], 7), (stamps[2], 9)]
        );
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_weekly_on_empty_store() {
        let (_clock, store) = clocked_store();
        let aggregator = TimeframeAggregator::new(store);

        assert!(aggregator.filter("weekly").is_empty());
        assert!(aggregator.aggregate("weekly").is_none());
    }

    #[test]
    fn test_entries_without_concerns_have_no_series() {
        let (_clock, store) = clocked_store();
        store.append("1", "just a day", SentimentResult::neutral(), Vec::new());
        let aggregator = TimeframeAggregator::new(store);

        assert_eq!(aggregator.filter("daily").len(), 1);
        assert!(aggregator.aggregate("daily").is_none());
    }

    #[test]
    fn test_category_keyed_series() {
        let (clock, store) = clocked_store();
        store.append(
            "1",
            "anxious and nervous",
            SentimentResult::neutral(),
            vec![
                assessment("anxious", "Anxiety", 8),
                assessment("nervous", "Anxiety", 7),
            ],
        );
        clock.advance(Duration::minutes(10));
        store.append(
            "1",
            "can't sleep",
            SentimentResult::neutral(),
            vec![assessment("can't sleep", "Insomnia", 7)],
        );

        let series = TimeframeAggregator::new(store)
            .aggregate_by("hourly", SeriesKey::Category)
            .unwrap();

        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["Anxiety", "Insomnia"]);
        assert_eq!(series.get("Anxiety").unwrap().len(), 2);
        assert_eq!(series.point_count(), 3);
    }

    #[test]
    fn test_unknown_timeframe_is_empty() {
        let (_clock, store) = clocked_store();
        store.append(
            "1",
            "anxious",
            SentimentResult::neutral(),
            vec![assessment("anxious", "Anxiety", 8)],
        );
        let aggregator = TimeframeAggregator::new(store);

        assert!(aggregator.filter("fortnightly").is_empty());
        assert!(aggregator.aggregate("fortnightly").is_none());
    }

    #[test]
    fn test_timeframe_name_must_match_exactly() {
        let (_clock, store) = clocked_store();
        store.append(
            "1",
            "anxious",
            SentimentResult::neutral(),
            vec![assessment("anxious", "Anxiety", 8)],
        );
        let aggregator = TimeframeAggregator::new(store);

        assert_eq!(aggregator.filter("daily").len(), 1);
        assert!(aggregator.filter(" Daily ").is_empty());
        assert!(aggregator.aggregate("DAILY").is_none());
    }
}

mod windows {
    use super::*;

    #[test]
    fn test_daily_boundary_is_inclusive() {
        let (clock, store) = clocked_store();
        store.append(
            "1",
            "anxious",
            SentimentResult::neutral(),
            vec![assessment("anxious", "Anxiety", 8)],
        );

        clock.advance(Duration::days(1));
        let aggregator = TimeframeAggregator::new(Arc::clone(&store));
        assert_eq!(aggregator.filter("daily").len(), 1);

        clock.advance(Duration::milliseconds(1));
        assert!(aggregator.filter("daily").is_empty());
        assert_eq!(aggregator.filter("weekly").len(), 1);
    }

    #[test]
    fn test_windows_nest() {
        let (clock, store) = clocked_store();
        for hours_back in [24 * 20, 24 * 3, 5, 0] {
            clock.set(start() + Duration::days(30) - Duration::hours(hours_back));
            store.append(
                "1",
                "stressed",
                SentimentResult::neutral(),
                vec![assessment("stressed", "Stress", 8)],
            );
        }
        clock.set(start() + Duration::days(30));
        let aggregator = TimeframeAggregator::new(store);

        assert_eq!(aggregator.filter("hourly").len(), 1);
        assert_eq!(aggregator.filter("daily").len(), 2);
        assert_eq!(aggregator.filter("weekly").len(), 3);
        assert_eq!(aggregator.filter("monthly").len(), 4);
    }
}

mod store_behavior {
    use super::*;

    #[test]
    fn test_clock_going_backwards_keeps_order() {
        let (clock, store) = clocked_store();
        let first = store.append("1", "a", SentimentResult::neutral(), Vec::new());
        clock.set(start() - Duration::hours(1));
        let second = store.append("1", "b", SentimentResult::neutral(), Vec::new());

        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_last_dominant_concern_is_global() {
        let (_clock, store) = clocked_store();
        store.append(
            "alice",
            "anxious",
            SentimentResult::neutral(),
            vec![assessment("anxious", "Anxiety", 8)],
        );
        store.append(
            "bob",
            "can't sleep and tense",
            SentimentResult::neutral(),
            vec![
                assessment("tense", "Anxiety", 5),
                assessment("can't sleep", "Insomnia", 7),
            ],
        );

        assert_eq!(store.last_dominant_concern("alice").as_deref(), Some("can't sleep"));
        assert_eq!(
            store.last_dominant_concern_for_user("alice").as_deref(),
            Some("anxious")
        );
        assert!(store.last_dominant_concern_for_user("carol").is_none());
    }

    #[test]
    fn test_last_entry_without_concerns_reads_neutral() {
        let (_clock, store) = clocked_store();
        assert!(store.last_dominant_concern("1").is_none());

        store.append(
            "1",
            "anxious",
            SentimentResult::neutral(),
            vec![assessment("anxious", "Anxiety", 8)],
        );
        store.append("1", "fine", SentimentResult::neutral(), Vec::new());

        assert_eq!(
            store.last_dominant_concern("1").as_deref(),
            Some(NO_CONCERN_DOMINANT)
        );
    }

    #[test]
    fn test_dominant_concern_tie_goes_to_first() {
        let (_clock, store) = clocked_store();
        store.append(
            "1",
            "nervous and jittery",
            SentimentResult::neutral(),
            vec![
                assessment("nervous", "Anxiety", 7),
                assessment("jittery", "Anxiety", 7),
            ],
        );

        assert_eq!(store.last_dominant_concern("1").as_deref(), Some("nervous"));
    }

    #[tokio::test]
    async fn test_concurrent_appends_stay_ordered() {
        let store = Arc::new(TimelineStore::new());
        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    store.append(
                        format!("user-{}", worker),
                        format!("entry {}", i),
                        SentimentResult::neutral(),
                        vec![assessment("stressed", "Stress", 8)],
                    );
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = store.snapshot();
        assert_eq!(entries.len(), 200);
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(store.entries_for_user("user-3").len(), 25);
    }
}
