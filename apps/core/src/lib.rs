// MindScope core library
// Concern classification, timeline analytics and charting

pub mod analysis;
pub mod chart;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod timeline;

#[cfg(test)]
mod tests;
