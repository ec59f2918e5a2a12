//! Test Module
//!
//! Integration-style suites for the MindScope core.
//!
//! ## Test Categories
//! - `analysis_tests`: Sentiment, extraction, classification over the embedded data
//! - `timeline_tests`: Append ordering, windows, aggregation, dominant concern
//! - `chart_tests`: Rendering, no-data outcome, encoding
//! - `pipeline_tests`: Full process/report workflow and persistence mirroring
//! - `database_tests`: SQLite persistence of timeline entries

pub mod chart_tests;
pub mod timeline_tests;
