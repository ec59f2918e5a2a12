//! Timeframe Aggregator.
//!
//! Filters the timeline to a recency window and builds one intensity series per
//! concern. Points are never merged: each occurrence is its own point, and
//! smoothing is left to whoever consumes the series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::store::{TimelineEntry, TimelineStore};
use super::timeframe::Timeframe;

/// One (timestamp, intensity) observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub intensity: u8,
}

/// Points for one concern key, ascending by timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcernSeries {
    pub key: String,
    pub points: Vec<SeriesPoint>,
}

/// Concern key -> ordered points, keys in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedSeries {
    series: Vec<ConcernSeries>,
}

impl AggregatedSeries {
    pub fn get(&self, key: &str) -> Option<&[SeriesPoint]> {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.points.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConcernSeries> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of points across all keys
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

impl<'a> IntoIterator for &'a AggregatedSeries {
    type Item = &'a ConcernSeries;
    type IntoIter = std::slice::Iter<'a, ConcernSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

/// What a series is keyed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    /// The concern phrase, one point per distinct phrase per entry
    #[default]
    Phrase,
    /// The concern's category, one point per assessment
    Category,
}

#[derive(Default)]
struct SeriesBuilder {
    series: Vec<ConcernSeries>,
    positions: HashMap<String, usize>,
}

impl SeriesBuilder {
    fn push(&mut self, key: &str, point: SeriesPoint) {
        let index = match self.positions.get(key) {
            Some(&index) => index,
            None => {
                self.positions.insert(key.to_string(), self.series.len());
                self.series.push(ConcernSeries {
                    key: key.to_string(),
                    points: Vec::new(),
                });
                self.series.len() - 1
            }
        };
        self.series[index].points.push(point);
    }

    fn finish(self) -> AggregatedSeries {
        AggregatedSeries {
            series: self.series,
        }
    }
}

/// Read-side view over the timeline
#[derive(Clone)]
pub struct TimeframeAggregator {
    store: Arc<TimelineStore>,
}

impl TimeframeAggregator {
    pub fn new(store: Arc<TimelineStore>) -> Self {
        Self { store }
    }

    /// Entries inside the named window, ascending. Names must match exactly
    /// (`hourly`, `daily`, `weekly`, `monthly`); anything else yields nothing.
    pub fn filter(&self, timeframe: &str) -> Vec<Arc<TimelineEntry>> {
        match Timeframe::from_name(timeframe) {
            Some(timeframe) => self.filter_window(timeframe),
            None => {
                debug!(timeframe, "Unknown timeframe, returning no entries");
                Vec::new()
            }
        }
    }

    /// Entries with `timestamp >= now - window`
    pub fn filter_window(&self, timeframe: Timeframe) -> Vec<Arc<TimelineEntry>> {
        let start = self.store.now() - timeframe.window();
        self.store.entries_since(start)
    }

    /// Per-phrase series for the named window, `None` when there is no data
    pub fn aggregate(&self, timeframe: &str) -> Option<AggregatedSeries> {
        self.aggregate_by(timeframe, SeriesKey::Phrase)
    }

    /// Series for the named window keyed as requested, `None` when there is no data
    pub fn aggregate_by(&self, timeframe: &str, key: SeriesKey) -> Option<AggregatedSeries> {
        let entries = self.filter(timeframe);
        if entries.is_empty() {
            return None;
        }

        let mut builder = SeriesBuilder::default();
        for entry in &entries {
            match key {
                SeriesKey::Phrase => {
                    for (phrase, intensity) in entry.intensities() {
                        builder.push(
                            phrase,
                            SeriesPoint {
                                timestamp: entry.timestamp,
                                intensity,
                            },
                        );
                    }
                }
                SeriesKey::Category => {
                    for assessment in &entry.assessments {
                        builder.push(
                            &assessment.category,
                            SeriesPoint {
                                timestamp: entry.timestamp,
                                intensity: assessment.intensity,
                            },
                        );
                    }
                }
            }
        }

        let series = builder.finish();
        debug!(
            timeframe,
            entries = entries.len(),
            keys = series.len(),
            points = series.point_count(),
            "Aggregated timeline"
        );

        // Entries without any concerns produce nothing to plot
        if series.is_empty() {
            None
        } else {
            Some(series)
        }
    }
}
