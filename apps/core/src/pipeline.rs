//! Concern Pipeline - request-level orchestration.
//!
//! Ties the analyzer, the shared timeline, the aggregator and the renderer
//! together, and mirrors every appended entry to an optional durable sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::analysis::{
    ConcernAnalyzer, KeywordSpanRecognizer, SentimentLabel, Taxonomy, ValenceLexicon,
};
use crate::chart::{GraphRenderer, RenderOutcome};
use crate::config::AppConfig;
use crate::database;
use crate::error::AppError;
use crate::models::EntryRecord;
use crate::timeline::{AggregatedSeries, TimeframeAggregator, TimelineEntry, TimelineStore};

/// Defines the public interface for a durable mirror of the timeline.
///
/// The in-memory timeline stays authoritative; a sink only receives copies.
#[async_trait]
pub trait EntrySink: Send + Sync + 'static {
    /// Persists one appended entry.
    async fn mirror(&self, record: &EntryRecord) -> Result<(), AppError>;
}

/// `EntrySink` backed by the SQLite `timeline_entries` table.
#[derive(Clone)]
pub struct SqliteEntrySink {
    pool: SqlitePool,
}

impl SqliteEntrySink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `database_url` and wrap it.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        Ok(Self::new(database::init_db(database_url).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EntrySink for SqliteEntrySink {
    async fn mirror(&self, record: &EntryRecord) -> Result<(), AppError> {
        database::insert_entry(&self.pool, record).await?;
        Ok(())
    }
}

/// Canned reply for a sentiment label
pub fn acknowledgement(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "I'm glad to hear that you're feeling positive!",
        SentimentLabel::Neutral => "It seems like you're feeling neutral.",
        SentimentLabel::Negative => "I'm sorry you're feeling this way. Let me know if I can help.",
    }
}

/// Everything a caller gets back for one processed input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sentiment: SentimentLabel,
    pub compound: f64,
    pub sentiment_keywords: Vec<String>,
    /// Extraction order, duplicates kept
    pub concerns: Vec<String>,
    pub categories: IndexMap<String, String>,
    pub intensities: IndexMap<String, u8>,
    pub response_message: String,
    /// Whether the configured sink accepted the entry. `false` when no sink is set.
    pub persisted: bool,
}

impl ProcessOutcome {
    fn from_entry(entry: &TimelineEntry, persisted: bool) -> Self {
        Self {
            entry_id: entry.id,
            timestamp: entry.timestamp,
            sentiment: entry.sentiment.label,
            compound: entry.sentiment.compound,
            sentiment_keywords: entry.sentiment.keywords.clone(),
            concerns: entry.concerns().into_iter().map(str::to_string).collect(),
            categories: entry
                .categories()
                .into_iter()
                .map(|(concern, category)| (concern.to_string(), category.to_string()))
                .collect(),
            intensities: entry
                .intensities()
                .into_iter()
                .map(|(concern, intensity)| (concern.to_string(), intensity))
                .collect(),
            response_message: acknowledgement(entry.sentiment.label).to_string(),
            persisted,
        }
    }
}

/// Process inputs into the shared timeline and report over it
#[derive(Clone)]
pub struct ConcernPipeline {
    analyzer: ConcernAnalyzer,
    timeline: Arc<TimelineStore>,
    aggregator: TimeframeAggregator,
    renderer: GraphRenderer,
    sink: Option<Arc<dyn EntrySink>>,
}

impl ConcernPipeline {
    pub fn new(analyzer: ConcernAnalyzer, timeline: Arc<TimelineStore>) -> Self {
        Self {
            analyzer,
            aggregator: TimeframeAggregator::new(Arc::clone(&timeline)),
            timeline,
            renderer: GraphRenderer::default(),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EntrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_renderer(mut self, renderer: GraphRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Build the pipeline described by `config`: taxonomy and lexicon from disk when
    /// paths are set (embedded copies otherwise), and a SQLite sink when a database
    /// URL is set.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let taxonomy = match &config.taxonomy_path {
            Some(path) => Taxonomy::from_path(path)?,
            None => Taxonomy::embedded()?,
        };
        let lexicon = match &config.lexicon_path {
            Some(path) => ValenceLexicon::from_path(path)?,
            None => ValenceLexicon::embedded()?,
        };
        let recognizer = KeywordSpanRecognizer::from_taxonomy(&taxonomy, &config.concern_label)?;

        info!(
            taxonomy_version = taxonomy.version(),
            categories = taxonomy.len(),
            lexicon_entries = lexicon.len(),
            policy = ?config.intensity_policy,
            "Analysis collaborators loaded"
        );

        let analyzer = ConcernAnalyzer::from_parts(
            Arc::new(taxonomy),
            Arc::new(lexicon),
            Arc::new(recognizer),
            &config.concern_label,
            config.intensity_policy,
        );

        let mut pipeline = Self::new(analyzer, Arc::new(TimelineStore::new()));
        if let Some(url) = &config.database_url {
            pipeline = pipeline.with_sink(Arc::new(SqliteEntrySink::connect(url).await?));
        }
        Ok(pipeline)
    }

    pub fn timeline(&self) -> &Arc<TimelineStore> {
        &self.timeline
    }

    pub fn analyzer(&self) -> &ConcernAnalyzer {
        &self.analyzer
    }

    /// Score one input, append it to the timeline and mirror it to the sink.
    ///
    /// Collaborator errors abort before anything is appended. A sink failure is
    /// logged and reported through `persisted`, never returned.
    #[instrument(skip(self, text))]
    pub async fn process(&self, user_id: &str, text: &str) -> Result<ProcessOutcome, AppError> {
        let report = self.analyzer.analyze(text)?;
        let entry = self.timeline.append_report(user_id, report);

        let persisted = match &self.sink {
            Some(sink) => match sink.mirror(&EntryRecord::from(entry.as_ref())).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(entry_id = %entry.id, "Failed to persist timeline entry: {}", e);
                    false
                }
            },
            None => false,
        };

        Ok(ProcessOutcome::from_entry(&entry, persisted))
    }

    /// Per-concern series for a timeframe name; `None` when there is nothing to plot.
    pub fn series(&self, timeframe: &str) -> Option<AggregatedSeries> {
        self.aggregator.aggregate(timeframe)
    }

    /// Aggregate then render a timeframe
    #[instrument(skip(self))]
    pub fn report(&self, timeframe: &str) -> Result<RenderOutcome, AppError> {
        match self.aggregator.aggregate(timeframe) {
            Some(series) => self.renderer.render(&series, timeframe),
            None => Ok(RenderOutcome::NoData),
        }
    }

    /// Dominant concern of the most recent entry in the log
    pub fn last_dominant_concern(&self, user_id: &str) -> Option<String> {
        self.timeline.last_dominant_concern(user_id)
    }
}
