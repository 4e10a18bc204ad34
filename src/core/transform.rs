//! Conversions between the three coordinate spaces a map overlay deals with:
//!
//! * **game** – the coordinates the client shows, `[1, 42]` per axis at
//!   `sizeFactor = 100`;
//! * **normalized** – a fraction `[0, 1]` of the map texture;
//! * **screen** – canvas pixels under the current [`View`].
//!
//! All conversions are pure and never fail: missing calibration data falls
//! back to defaults and off-image screen points are clamped.

use crate::{
    constants::{GAME_COORD_ORIGIN, GAME_COORD_SPAN, TEXTURE_CENTER, TEXTURE_SIZE},
    core::{calibration::MapCalibration, geo::Point, view::View},
    traits::CoordinateTransform,
};

/// Coordinate transformer bound to one map's calibration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateTransformer {
    calibration: MapCalibration,
}

impl CoordinateTransformer {
    pub fn new(calibration: MapCalibration) -> Self {
        Self { calibration }
    }

    /// Transformer for a map whose calibration may be unknown
    pub fn for_map(calibration: Option<&MapCalibration>) -> Self {
        Self::new(MapCalibration::or_default(calibration))
    }

    pub fn calibration(&self) -> &MapCalibration {
        &self.calibration
    }

    /// Inverse of [`Self::normalized_to_game`]
    pub fn game_to_normalized(game_x: f64, game_y: f64, calibration: &MapCalibration) -> Point {
        let c = calibration.scale();
        Point::new(
            (game_x - GAME_COORD_ORIGIN) * c / GAME_COORD_SPAN,
            (game_y - GAME_COORD_ORIGIN) * c / GAME_COORD_SPAN,
        )
    }

    /// `game = (41 / c) * n + 1` on both axes, with `c = sizeFactor / 100`
    pub fn normalized_to_game(nx: f64, ny: f64, calibration: &MapCalibration) -> Point {
        let c = calibration.scale();
        Point::new(
            (GAME_COORD_SPAN / c) * nx + GAME_COORD_ORIGIN,
            (GAME_COORD_SPAN / c) * ny + GAME_COORD_ORIGIN,
        )
    }

    /// Places a texture fraction on the canvas
    pub fn normalized_to_screen(nx: f64, ny: f64, view: &View) -> Point {
        let pixel_x = nx * view.image_size.width;
        let pixel_y = ny * view.image_size.height;
        Point::new(
            view.image_position.x + pixel_x * view.scale,
            view.image_position.y + pixel_y * view.scale,
        )
    }

    /// Inverse of [`Self::normalized_to_screen`], clamped to `[0, 1]` so that
    /// points outside the image bind to the nearest edge
    pub fn screen_to_normalized(screen_x: f64, screen_y: f64, view: &View) -> Point {
        let scaled = view.scaled_size();
        if scaled.is_empty() {
            return Point::default();
        }

        Point::new(
            (screen_x - view.image_position.x) / scaled.width,
            (screen_y - view.image_position.y) / scaled.height,
        )
        .clamp_unit()
    }

    /// Raw position on the 2048-unit reference texture to a texture fraction
    pub fn texture_pixel_to_normalized(pixel_x: f64, pixel_y: f64) -> Point {
        Point::new(pixel_x / TEXTURE_SIZE, pixel_y / TEXTURE_SIZE)
    }

    pub fn normalized_to_texture_pixel(nx: f64, ny: f64) -> Point {
        Point::new(nx * TEXTURE_SIZE, ny * TEXTURE_SIZE)
    }

    /// World units (as stored for NPCs, levels, ...) to game coordinates.
    /// This is the only conversion that consumes the calibration offsets.
    pub fn world_to_game(world_x: f64, world_y: f64, calibration: &MapCalibration) -> Point {
        let c = calibration.scale();
        let pixel_x = (world_x + calibration.offset_x) * c + TEXTURE_CENTER;
        let pixel_y = (world_y + calibration.offset_y) * c + TEXTURE_CENTER;
        let normalized = Self::texture_pixel_to_normalized(pixel_x, pixel_y);
        Self::normalized_to_game(normalized.x, normalized.y, calibration)
    }

    pub fn game_to_world(game_x: f64, game_y: f64, calibration: &MapCalibration) -> Point {
        let c = calibration.scale();
        let normalized = Self::game_to_normalized(game_x, game_y, calibration);
        let pixel = Self::normalized_to_texture_pixel(normalized.x, normalized.y);
        Point::new(
            (pixel.x - TEXTURE_CENTER) / c - calibration.offset_x,
            (pixel.y - TEXTURE_CENTER) / c - calibration.offset_y,
        )
    }
}

impl CoordinateTransform for CoordinateTransformer {
    fn project(&self, game: Point, view: &View) -> Point {
        let normalized = Self::game_to_normalized(game.x, game.y, &self.calibration);
        Self::normalized_to_screen(normalized.x, normalized.y, view)
    }

    fn unproject(&self, screen: Point, view: &View) -> Point {
        let normalized = Self::screen_to_normalized(screen.x, screen.y, view);
        Self::normalized_to_game(normalized.x, normalized.y, &self.calibration)
    }

    fn to_normalized(&self, game: Point) -> Point {
        Self::game_to_normalized(game.x, game.y, &self.calibration)
    }
}
