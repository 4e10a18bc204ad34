//! Shared trait abstractions for the seams between the core and its
//! collaborators.

use crate::core::{geo::Point, view::View};

/// Trait for coordinate transformation operations
pub trait CoordinateTransform {
    /// Game coordinates to screen pixels under `view`
    fn project(&self, game: Point, view: &View) -> Point;

    /// Screen pixels back to game coordinates (clamped to the image)
    fn unproject(&self, screen: Point, view: &View) -> Point;

    /// Game coordinates to a texture fraction
    fn to_normalized(&self, game: Point) -> Point;
}
