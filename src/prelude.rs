//! Prelude module for common zonemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use zonemap::prelude::*;`

pub use crate::core::{
    calibration::MapCalibration,
    config::{
        ExtractionConfig, HoverConfig, PipelineOptions, PipelineProfile, PlacementConfig,
        SchedulerConfig, Verbosity,
    },
    geo::{Point, Size},
    overlay::{MapShown, MarkerOverlay},
    transform::CoordinateTransformer,
    view::View,
};

pub use crate::markers::{
    cache::MarkerCache,
    classifier::MarkerClassifier,
    extractor::MarkerExtractor,
    icon::{icon_path, icon_path_hr},
    marker::{MapMarker, MarkerSet, MarkerTier, MarkerType},
};

pub use crate::data::{
    flat_file::FlatMarkerFile,
    sheet::{JsonSheet, MapInfo, MarkerSheet},
};

pub use crate::input::hover::{HoverTracker, HoverTransition};

pub use crate::rendering::{
    pipeline::{MarkerFrame, MarkerRenderer, PlacedMarker, RenderPipeline},
    scheduler::{DisplayOutcome, DisplayRequest, RenderScheduler},
};

pub use crate::spatial::index::{marker_at, MarkerIndex};

pub use crate::background::tasks::ExtractionWorker;

pub use crate::traits::CoordinateTransform;

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
