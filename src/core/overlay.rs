//! The marker overlay of one map view: the single owner of the marker cache,
//! the scheduler and hover state, driven by the host's UI events.

use crate::{
    core::{
        calibration::MapCalibration,
        config::PipelineOptions,
        geo::Point,
        transform::CoordinateTransformer,
        view::View,
    },
    input::hover::{HoverTracker, HoverTransition},
    markers::{
        cache::MarkerCache,
        extractor::MarkerExtractor,
        marker::{MapMarker, MarkerSet, MarkerType},
    },
    rendering::{
        pipeline::MarkerRenderer,
        scheduler::{DisplayOutcome, DisplayRequest, RenderScheduler},
    },
    spatial::index::MarkerIndex,
    traits::CoordinateTransform,
    MapError, Result,
};
use std::sync::Arc;

struct CurrentMap {
    map_id: u32,
    calibration: MapCalibration,
    index: MarkerIndex,
}

/// Result of switching maps
#[derive(Debug, Clone)]
pub struct MapShown {
    pub markers: Arc<MarkerSet>,
    pub outcome: DisplayOutcome,
    /// `Left` for a marker still hovered on the previous map
    pub hover: Option<HoverTransition>,
}

pub struct MarkerOverlay<R: MarkerRenderer> {
    options: PipelineOptions,
    extractor: MarkerExtractor,
    cache: MarkerCache,
    scheduler: RenderScheduler<R>,
    hover: HoverTracker,
    current: Option<CurrentMap>,
    view: View,
}

impl<R: MarkerRenderer> MarkerOverlay<R> {
    pub fn new(options: PipelineOptions, extractor: MarkerExtractor, renderer: R) -> Self {
        Self {
            scheduler: RenderScheduler::new(&options, renderer),
            hover: HoverTracker::new(&options),
            options,
            extractor,
            cache: MarkerCache::new(),
            current: None,
            view: View::default(),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn cache(&self) -> &MarkerCache {
        &self.cache
    }

    /// Mutable access for marshalling background results into the cache
    pub fn cache_mut(&mut self) -> &mut MarkerCache {
        &mut self.cache
    }

    pub fn scheduler(&self) -> &RenderScheduler<R> {
        &self.scheduler
    }

    pub fn current_map(&self) -> Option<u32> {
        self.current.as_ref().map(|current| current.map_id)
    }

    pub fn current_markers(&self) -> Option<Arc<MarkerSet>> {
        self.current.as_ref().map(|current| current.index.markers().clone())
    }

    pub fn hovered(&self) -> Option<&MapMarker> {
        self.hover.hovered()
    }

    /// Switches to `map_id`, extracting its markers on first use, and
    /// requests a redisplay
    pub fn show_map(&mut self, map_id: u32) -> MapShown {
        let extractor = &self.extractor;
        let markers = self
            .cache
            .get_or_extract(map_id, |id| extractor.extract_markers(id));
        let calibration = extractor.calibration(map_id);

        self.current = Some(CurrentMap {
            map_id,
            calibration,
            index: MarkerIndex::new(markers.clone(), &calibration),
        });
        let hover = self.hover.reset();

        let outcome = self.request_display();
        MapShown {
            markers,
            outcome,
            hover,
        }
    }

    pub fn set_view(&mut self, view: View) -> DisplayOutcome {
        self.view = view;
        self.request_display()
    }

    pub fn pan(&mut self, delta: Point) -> DisplayOutcome {
        self.view.pan(delta);
        self.request_display()
    }

    pub fn zoom_at(&mut self, factor: f64, focus: Point) -> DisplayOutcome {
        self.view.zoom_at(factor, focus);
        self.request_display()
    }

    /// Drives the deferred redisplay; call from the host event loop
    pub fn tick(&mut self) -> bool {
        self.scheduler.tick()
    }

    pub fn pointer_moved(&mut self, screen: Point) -> Option<HoverTransition> {
        let current = self.current.as_ref()?;
        self.hover.on_pointer_move(screen, &self.view, &current.index)
    }

    pub fn pointer_left(&mut self) -> Option<HoverTransition> {
        self.hover.on_pointer_leave()
    }

    /// Game coordinates under a screen point, clamped to the map image
    pub fn game_position_at(&self, screen: Point) -> Result<Point> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| MapError::InvalidState("no map is shown".into()))?;
        Ok(CoordinateTransformer::new(current.calibration).unproject(screen, &self.view))
    }

    /// Marker under a click, if any
    pub fn marker_at(&self, screen: Point) -> Option<&MapMarker> {
        let current = self.current.as_ref()?;
        current.index.marker_at(screen, &self.view, &self.options.hover)
    }

    /// Shows or hides every marker of one type on the current map. Returns
    /// how many markers changed, and `Left` if the hovered one was hidden.
    pub fn set_type_visible(
        &mut self,
        marker_type: MarkerType,
        visible: bool,
    ) -> Result<(usize, Option<HoverTransition>)> {
        let map_id = self
            .current_map()
            .ok_or_else(|| MapError::InvalidState("no map is shown".into()))?;

        let touched = self.cache.set_type_visible(map_id, marker_type, visible);
        if touched == 0 {
            return Ok((0, None));
        }

        let released = if visible {
            None
        } else {
            self.hover
                .release_if(|marker| marker.map_id == map_id && marker.marker_type() == marker_type)
        };
        self.refresh_index(map_id);
        self.request_display();
        Ok((touched, released))
    }

    fn refresh_index(&mut self, map_id: u32) {
        if let (Some(current), Some(markers)) = (self.current.as_mut(), self.cache.get(map_id)) {
            current.index = MarkerIndex::new(markers, &current.calibration);
        }
    }

    fn request_display(&mut self) -> DisplayOutcome {
        let Some(current) = self.current.as_ref() else {
            return DisplayOutcome::Dropped;
        };
        let request = DisplayRequest::new(current.index.markers().clone(), self.view, current.calibration);
        self.scheduler.request_display(request)
    }
}
