use crate::core::geo::{Point, Size};
use serde::{Deserialize, Serialize};

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 8.0;

/// The current view of one map image on the canvas.
///
/// The view is owned by the interaction layer and supplied per transform
/// call; nothing here is persisted. Scale is applied explicitly: a texture
/// fraction `n` lands at `image_position + n * image_size * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Current zoom factor (1.0 = image drawn at `image_size`)
    pub scale: f64,
    /// Pixel offset of the map image origin on the canvas
    pub image_position: Point,
    /// Unscaled rendered pixel dimensions of the map texture
    pub image_size: Size,
}

impl View {
    pub fn new(scale: f64, image_position: Point, image_size: Size) -> Self {
        Self {
            scale,
            image_position,
            image_size,
        }
    }

    /// Rendered image dimensions after applying the zoom
    pub fn scaled_size(&self) -> Size {
        Size::new(
            self.image_size.width * self.scale,
            self.image_size.height * self.scale,
        )
    }

    /// Pans by a screen-space delta
    pub fn pan(&mut self, delta: Point) {
        self.image_position = self.image_position.add(&delta);
    }

    /// Zooms by `factor` around a screen-space focus point, keeping the
    /// image point under the focus fixed on screen
    pub fn zoom_at(&mut self, factor: f64, focus: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        self.image_position = Point::new(
            focus.x - (focus.x - self.image_position.x) * ratio,
            focus.y - (focus.y - self.image_position.y) * ratio,
        );
        self.scale = new_scale;
    }

    /// Fits and centres the image inside a canvas of the given size
    pub fn fit(&mut self, canvas: Size) {
        if canvas.is_empty() || self.image_size.is_empty() {
            return;
        }

        let scale_x = canvas.width / self.image_size.width;
        let scale_y = canvas.height / self.image_size.height;
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        let scaled = self.scaled_size();
        self.image_position = Point::new(
            (canvas.width - scaled.width) / 2.0,
            (canvas.height - scaled.height) / 2.0,
        );
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new(1.0, Point::default(), Size::default())
    }
}
