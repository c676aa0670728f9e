//! LapStory Core Library
//!
//! This crate provides the lap telemetry data model, the bounded telemetry
//! window and the race story pipeline (detection, ranking and narrative
//! rendering). It performs no I/O.

pub mod buffer;
pub mod error;
pub mod model;
pub mod narrative;
pub mod ranker;
pub mod story;
pub mod units;

pub use buffer::TelemetryBuffer;
pub use error::FrameError;
pub use model::{Evidence, Highlight, HighlightKind, TelemetryFrame};
pub use narrative::BroadcastCard;
