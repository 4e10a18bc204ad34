//! Turns a marker set and a view into screen placements for the external
//! renderer: visibility filter, then classification, then geometry.

use crate::{
    core::{
        calibration::MapCalibration,
        config::{PipelineOptions, PlacementConfig},
        geo::Point,
        transform::CoordinateTransformer,
        view::View,
    },
    markers::{
        classifier::MarkerClassifier,
        marker::{MapMarker, MarkerSet, MarkerType},
    },
};

/// A marker ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub marker_id: u32,
    pub marker_type: MarkerType,
    /// `None` for text/symbol-only markers
    pub icon_path: Option<String>,
    pub label: Option<String>,
    /// Centre of the marker on the canvas
    pub screen: Point,
    /// Edge length of the icon in screen pixels
    pub size: f64,
}

/// Everything the renderer needs for one redisplay
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    pub map_id: u32,
    pub view: View,
    pub markers: Vec<PlacedMarker>,
}

/// The presentation layer that actually draws markers
pub trait MarkerRenderer {
    fn render(&mut self, frame: &MarkerFrame);
}

impl<F> MarkerRenderer for F
where
    F: FnMut(&MarkerFrame),
{
    fn render(&mut self, frame: &MarkerFrame) {
        self(frame)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    classifier: MarkerClassifier,
    placement: PlacementConfig,
}

impl RenderPipeline {
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            classifier: MarkerClassifier::new(options.verbosity),
            placement: options.placement.clone(),
        }
    }

    pub fn build_frame(
        &self,
        map_id: u32,
        markers: &MarkerSet,
        calibration: &MapCalibration,
        view: &View,
    ) -> MarkerFrame {
        let size = self.placement.icon_size(view.scale);

        let placed = markers
            .visible()
            .map(|marker| self.place(marker, calibration, view, size))
            .collect();

        MarkerFrame {
            map_id,
            view: *view,
            markers: placed,
        }
    }

    fn place(&self, marker: &MapMarker, calibration: &MapCalibration, view: &View, size: f64) -> PlacedMarker {
        let marker_type = if marker.is_type_undetermined() {
            self.classifier.derive_type(marker.icon_id, marker.place_name.as_deref())
        } else {
            marker.marker_type()
        };

        let normalized = CoordinateTransformer::game_to_normalized(marker.x, marker.y, calibration);
        let screen = CoordinateTransformer::normalized_to_screen(normalized.x, normalized.y, view);

        PlacedMarker {
            marker_id: marker.id,
            marker_type,
            icon_path: (!marker.is_text_only()).then(|| marker.icon_path()),
            label: marker.place_name.clone(),
            screen,
            size,
        }
    }
}
