use crate::{
    core::{
        calibration::MapCalibration, config::HoverConfig, geo::Point,
        transform::CoordinateTransformer, view::View,
    },
    markers::marker::{MapMarker, MarkerSet},
};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::sync::Arc;

/// A visible marker placed in normalized texture space
#[derive(Debug, Clone, PartialEq)]
struct IndexedMarker {
    position: [f64; 2],
    slot: usize,
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedMarker {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over the visible markers of one map, for repeated hit-tests
/// against a changing view
pub struct MarkerIndex {
    markers: Arc<MarkerSet>,
    calibration: MapCalibration,
    rtree: RTree<IndexedMarker>,
}

impl MarkerIndex {
    pub fn new(markers: Arc<MarkerSet>, calibration: &MapCalibration) -> Self {
        let items = markers
            .markers()
            .iter()
            .enumerate()
            .filter(|(_, marker)| marker.visible)
            .map(|(slot, marker)| {
                let n = CoordinateTransformer::game_to_normalized(marker.x, marker.y, calibration);
                IndexedMarker {
                    position: [n.x, n.y],
                    slot,
                }
            })
            .collect();

        Self {
            markers,
            calibration: *calibration,
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn map_id(&self) -> u32 {
        self.markers.map_id
    }

    pub fn markers(&self) -> &Arc<MarkerSet> {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// Nearest visible marker within the zoom-scaled hit radius of `screen`
    pub fn marker_at(&self, screen: Point, view: &View, hover: &HoverConfig) -> Option<&MapMarker> {
        let scaled = view.scaled_size();
        if scaled.is_empty() {
            return None;
        }

        let radius = hover.hit_radius(view.scale);
        let query = [
            (screen.x - view.image_position.x) / scaled.width,
            (screen.y - view.image_position.y) / scaled.height,
        ];
        // a screen circle of `radius` fits in this normalized circle
        let normalized_radius = radius / scaled.min_edge();

        self.rtree
            .locate_within_distance(query, normalized_radius * normalized_radius)
            .map(|item| &self.markers.markers()[item.slot])
            .map(|marker| (marker, screen_position(marker, &self.calibration, view).distance_to(&screen)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(marker, _)| marker)
    }
}

/// One-shot hit-test: nearest visible marker of `markers` within
/// `max(min_hit_radius, base_hit_radius / scale)` screen pixels of `screen`
pub fn marker_at<'a>(
    screen: Point,
    view: &View,
    calibration: &MapCalibration,
    markers: &'a MarkerSet,
    hover: &HoverConfig,
) -> Option<&'a MapMarker> {
    if view.scaled_size().is_empty() {
        return None;
    }

    let radius = hover.hit_radius(view.scale);
    markers
        .visible()
        .map(|marker| (marker, screen_position(marker, calibration, view).distance_to(&screen)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(marker, _)| marker)
}

fn screen_position(marker: &MapMarker, calibration: &MapCalibration, view: &View) -> Point {
    let n = CoordinateTransformer::game_to_normalized(marker.x, marker.y, calibration);
    CoordinateTransformer::normalized_to_screen(n.x, n.y, view)
}
