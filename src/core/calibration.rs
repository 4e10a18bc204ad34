use crate::constants::DEFAULT_SIZE_FACTOR;
use serde::{Deserialize, Serialize};

/// Per-map constants relating game-world units to the map texture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCalibration {
    /// Percentage-based scale divisor (100 = 1:1)
    #[serde(default)]
    pub size_factor: f64,
    /// Texture-space offset applied to world X before scaling
    #[serde(default)]
    pub offset_x: f64,
    /// Texture-space offset applied to world Y before scaling
    #[serde(default)]
    pub offset_y: f64,
}

impl MapCalibration {
    pub fn new(size_factor: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            size_factor,
            offset_x,
            offset_y,
        }
    }

    /// Calibration with the given size factor and no offsets
    pub fn with_size_factor(size_factor: f64) -> Self {
        Self::new(size_factor, 0.0, 0.0)
    }

    /// Resolves an optional calibration, falling back to the defaults
    pub fn or_default(calibration: Option<&MapCalibration>) -> MapCalibration {
        calibration.copied().unwrap_or_default()
    }

    /// Size factor safe to divide by: zero, negative or non-finite values
    /// are replaced with [`DEFAULT_SIZE_FACTOR`].
    pub fn effective_size_factor(&self) -> f64 {
        if self.size_factor.is_finite() && self.size_factor > 0.0 {
            self.size_factor
        } else {
            DEFAULT_SIZE_FACTOR
        }
    }

    /// The scale `c = sizeFactor / 100`
    pub fn scale(&self) -> f64 {
        self.effective_size_factor() / 100.0
    }
}

impl Default for MapCalibration {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_FACTOR, 0.0, 0.0)
    }
}
