//! Chart Module Tests

use crate::analysis::{ConcernAssessment, SentimentResult};
use crate::chart::{GraphRenderer, RenderOutcome};
use crate::error::AppError;
use crate::timeline::{AggregatedSeries, ManualClock, TimeframeAggregator, TimelineStore};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

/// Two concerns over three entries an hour apart
fn sample_series() -> AggregatedSeries {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(),
    ));
    let store = Arc::new(TimelineStore::with_clock(clock.clone()));
    for (phrase, category, intensity) in [
        ("anxious", "Anxiety", 8),
        ("can't sleep", "Insomnia", 7),
        ("anxious", "Anxiety", 6),
    ] {
        store.append(
            "1",
            phrase,
            SentimentResult::neutral(),
            vec![ConcernAssessment {
                phrase: phrase.to_string(),
                category: category.to_string(),
                intensity,
            }],
        );
        clock.advance(Duration::hours(1));
    }
    TimeframeAggregator::new(store).aggregate("daily").unwrap()
}

#[test]
fn test_render_produces_artifact() {
    let outcome = GraphRenderer::default()
        .render(&sample_series(), "daily")
        .unwrap();

    let artifact = outcome.artifact().expect("rendered");
    assert_eq!(artifact.title, "Mental Health Intensity Over Time (Daily)");
    assert_eq!(artifact.x_label, "Timestamp");
    assert_eq!(artifact.y_label, "Intensity");
    assert_eq!(artifact.legend(), vec!["anxious", "can't sleep"]);
    assert!(artifact.svg.starts_with("<svg"));
    assert_eq!(artifact.svg.matches("<polyline").count(), 2);
    assert_eq!(artifact.svg.matches("<circle").count(), 3);
    assert!(artifact.svg.contains("can&apos;t sleep"));
}

#[test]
fn test_base64_decodes_to_svg() {
    let outcome = GraphRenderer::default()
        .render(&sample_series(), "weekly")
        .unwrap();
    let artifact = outcome.artifact().unwrap();

    let decoded = STANDARD.decode(artifact.to_base64()).unwrap();
    assert_eq!(decoded, artifact.svg.as_bytes());
    assert!(artifact.data_uri().starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn test_empty_series_is_no_data() {
    let outcome = GraphRenderer::default()
        .render(&AggregatedSeries::default(), "weekly")
        .unwrap();
    assert_eq!(outcome, RenderOutcome::NoData);
}

#[test]
fn test_tiny_canvas_is_render_error() {
    let result = GraphRenderer::new(100, 100).render(&sample_series(), "daily");
    assert!(matches!(result, Err(AppError::Render(_))));
}

#[test]
fn test_rendered_outcome_serializes_series() {
    let outcome = GraphRenderer::default()
        .render(&sample_series(), "daily")
        .unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["status"], "rendered");
    assert_eq!(json["series"][0]["key"], "anxious");
    assert_eq!(json["series"][0]["points"][1]["intensity"], 6);
}
