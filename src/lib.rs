//! # zonemap
//!
//! Coordinate transformation and marker pipeline for territory map viewers.
//!
//! The crate maps raw game-world coordinates onto a rendered map texture and
//! the screen (and back), extracts and classifies the points of interest that
//! belong to each map, and throttles redisplay requests coming from
//! interactive pan/zoom so that rendering stays stable.

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod markers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    calibration::MapCalibration,
    config::{PipelineOptions, PipelineProfile, Verbosity},
    geo::{Point, Size},
    overlay::{MapShown, MarkerOverlay},
    transform::CoordinateTransformer,
    view::View,
};

pub use markers::{
    cache::MarkerCache,
    classifier::MarkerClassifier,
    extractor::MarkerExtractor,
    marker::{MapMarker, MarkerSet, MarkerTier, MarkerType},
};

pub use data::{flat_file::FlatMarkerFile, sheet::{JsonSheet, MarkerSheet}};

pub use input::hover::{HoverTracker, HoverTransition};

pub use rendering::{
    pipeline::{MarkerRenderer, PlacedMarker, RenderPipeline},
    scheduler::RenderScheduler,
};

pub use spatial::index::{marker_at, MarkerIndex};

pub use background::tasks::ExtractionWorker;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Row(#[from] data::RowError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type alias for convenience
pub type Error = MapError;
