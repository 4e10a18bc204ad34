//! Configuration system for the marker pipeline
//!
//! Mirrors a preset/custom layout: a [`PipelineProfile`] resolves to a full
//! set of [`PipelineOptions`], and every option struct can also be loaded from
//! JSON with missing fields taking their defaults.

use crate::{constants, MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineProfile {
    Balanced,
    LowPower,
    Custom(PipelineOptions),
}

impl PipelineProfile {
    pub fn resolve(&self) -> PipelineOptions {
        match self {
            Self::Balanced => PipelineOptions {
                extraction: ExtractionConfig::default(),
                scheduler: SchedulerConfig::default(),
                hover: HoverConfig::default(),
                placement: PlacementConfig::default(),
                verbosity: Verbosity::Normal,
            },
            Self::LowPower => PipelineOptions {
                extraction: ExtractionConfig {
                    max_markers: constants::MAX_MARKERS,
                    max_processing_time_ms: 1000,
                    flat_file_header_lines: constants::FLAT_FILE_HEADER_LINES,
                    synthesize_samples: true,
                },
                scheduler: SchedulerConfig {
                    min_apply_interval_ms: 500,
                    deferred_delay_ms: 300,
                },
                hover: HoverConfig {
                    check_interval_ms: 100,
                    ..HoverConfig::default()
                },
                placement: PlacementConfig::default(),
                verbosity: Verbosity::Quiet,
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for PipelineProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// How much diagnostic detail the pipeline logs.
///
/// Passed into the extractor and scheduler at construction instead of living
/// in a process-wide flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn is_verbose(&self) -> bool {
        *self == Self::Verbose
    }

    pub fn is_quiet(&self) -> bool {
        *self == Self::Quiet
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub extraction: ExtractionConfig,
    pub scheduler: SchedulerConfig,
    pub hover: HoverConfig,
    pub placement: PlacementConfig,
    pub verbosity: Verbosity,
}

impl PipelineOptions {
    /// Parses options from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let options: PipelineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Rejects option combinations that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.extraction.max_markers == 0 {
            return Err(MapError::Config("extraction.max_markers must be > 0".into()));
        }
        if self.scheduler.deferred_delay_ms == 0 {
            return Err(MapError::Config(
                "scheduler.deferred_delay_ms must be > 0".into(),
            ));
        }
        if self.placement.min_icon_size_px > self.placement.max_icon_size_px {
            return Err(MapError::Config(
                "placement.min_icon_size_px exceeds max_icon_size_px".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineProfile::default().resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub max_markers: usize,
    pub max_processing_time_ms: u64,
    pub flat_file_header_lines: usize,
    pub synthesize_samples: bool,
}

impl ExtractionConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.max_processing_time_ms)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_markers: constants::MAX_MARKERS,
            max_processing_time_ms: constants::MAX_PROCESSING_TIME_MS,
            flat_file_header_lines: constants::FLAT_FILE_HEADER_LINES,
            synthesize_samples: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub min_apply_interval_ms: u64,
    pub deferred_delay_ms: u64,
}

impl SchedulerConfig {
    pub fn min_apply_interval(&self) -> Duration {
        Duration::from_millis(self.min_apply_interval_ms)
    }

    pub fn deferred_delay(&self) -> Duration {
        Duration::from_millis(self.deferred_delay_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_apply_interval_ms: constants::MIN_APPLY_INTERVAL_MS,
            deferred_delay_ms: constants::DEFERRED_APPLY_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub check_interval_ms: u64,
    pub base_hit_radius_px: f64,
    pub min_hit_radius_px: f64,
}

impl HoverConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Screen-space hit radius at the given zoom: `max(min, base / scale)`
    pub fn hit_radius(&self, scale: f64) -> f64 {
        if scale > 0.0 {
            (self.base_hit_radius_px / scale).max(self.min_hit_radius_px)
        } else {
            self.min_hit_radius_px
        }
    }
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: constants::HOVER_CHECK_INTERVAL_MS,
            base_hit_radius_px: constants::BASE_HIT_RADIUS_PX,
            min_hit_radius_px: constants::MIN_HIT_RADIUS_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub icon_size_px: f64,
    pub min_icon_size_px: f64,
    pub max_icon_size_px: f64,
}

impl PlacementConfig {
    /// On-screen icon edge for the given zoom
    pub fn icon_size(&self, scale: f64) -> f64 {
        (self.icon_size_px * scale.max(0.0).sqrt()).clamp(self.min_icon_size_px, self.max_icon_size_px)
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            icon_size_px: constants::MARKER_ICON_SIZE,
            min_icon_size_px: constants::MARKER_ICON_SIZE_RANGE.0,
            max_icon_size_px: constants::MARKER_ICON_SIZE_RANGE.1,
        }
    }
}
