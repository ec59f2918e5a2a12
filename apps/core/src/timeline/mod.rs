//! # Timeline Module
//!
//! Append-only log of scored entries and the time-windowed views over it.
//!
//! ## Components
//! - `clock`: Injectable wall clock
//! - `store`: The shared timeline and its entries
//! - `timeframe`: Named recency windows
//! - `aggregator`: Window filtering and per-concern series

pub mod aggregator;
pub mod clock;
pub mod store;
pub mod timeframe;

pub use aggregator::{AggregatedSeries, ConcernSeries, SeriesKey, SeriesPoint, TimeframeAggregator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{TimelineEntry, TimelineStore, NO_CONCERN_DOMINANT};
pub use timeframe::Timeframe;
