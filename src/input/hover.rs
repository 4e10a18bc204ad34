use crate::{
    core::{
        config::{HoverConfig, PipelineOptions},
        geo::Point,
        view::View,
    },
    markers::marker::MapMarker,
    spatial::index::MarkerIndex,
};
use std::time::Instant;

/// Edge-triggered hover change
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTransition {
    Entered(MapMarker),
    Left(MapMarker),
    /// The pointer moved straight from one marker onto another
    Switched { left: MapMarker, entered: MapMarker },
}

/// Tracks the marker under the pointer.
///
/// Hit-tests run at most once per check interval; in between, pointer moves
/// are ignored. Only changes are reported.
#[derive(Debug, Clone)]
pub struct HoverTracker {
    config: HoverConfig,
    last_check: Option<Instant>,
    hovered: Option<MapMarker>,
}

impl HoverTracker {
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            config: options.hover.clone(),
            last_check: None,
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<&MapMarker> {
        self.hovered.as_ref()
    }

    pub fn on_pointer_move(&mut self, screen: Point, view: &View, index: &MarkerIndex) -> Option<HoverTransition> {
        self.on_pointer_move_at(screen, view, index, Instant::now())
    }

    pub fn on_pointer_move_at(
        &mut self,
        screen: Point,
        view: &View,
        index: &MarkerIndex,
        now: Instant,
    ) -> Option<HoverTransition> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.config.check_interval() {
                return None;
            }
        }
        self.last_check = Some(now);

        let hit = index.marker_at(screen, view, &self.config).cloned();
        self.transition_to(hit)
    }

    /// Pointer left the canvas
    pub fn on_pointer_leave(&mut self) -> Option<HoverTransition> {
        self.hovered.take().map(HoverTransition::Left)
    }

    /// Drops hover state when the map changes. A marker that was hovered
    /// is reported as `Left`.
    pub fn reset(&mut self) -> Option<HoverTransition> {
        self.last_check = None;
        self.hovered.take().map(HoverTransition::Left)
    }

    /// Ends the hover if the hovered marker matches `hidden`
    pub fn release_if<F>(&mut self, hidden: F) -> Option<HoverTransition>
    where
        F: FnOnce(&MapMarker) -> bool,
    {
        if !self.hovered.as_ref().map(hidden).unwrap_or(false) {
            return None;
        }
        self.hovered.take().map(HoverTransition::Left)
    }

    fn transition_to(&mut self, hit: Option<MapMarker>) -> Option<HoverTransition> {
        let same = match (&self.hovered, &hit) {
            (Some(current), Some(next)) => current.map_id == next.map_id && current.id == next.id,
            (None, None) => true,
            _ => false,
        };
        if same {
            return None;
        }

        match (self.hovered.take(), hit) {
            (None, Some(entered)) => {
                self.hovered = Some(entered.clone());
                Some(HoverTransition::Entered(entered))
            }
            (Some(left), None) => Some(HoverTransition::Left(left)),
            (Some(left), Some(entered)) => {
                self.hovered = Some(entered.clone());
                Some(HoverTransition::Switched { left, entered })
            }
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{calibration::MapCalibration, geo::Size};
    use crate::markers::marker::{MarkerSet, MarkerTier};
    use std::sync::Arc;
    use std::time::Duration;

    fn index() -> MarkerIndex {
        let set = MarkerSet::new(
            1,
            MarkerTier::Primary,
            vec![
                MapMarker::new(1, 1, 21.5, 21.5, 60453),
                MapMarker::new(2, 1, 11.25, 21.5, 60314),
            ],
        );
        MarkerIndex::new(Arc::new(set), &MapCalibration::default())
    }

    fn view() -> View {
        View::new(1.0, Point::default(), Size::square(1000.0))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_enter_and_leave_emit_once() {
        let index = index();
        let mut tracker = HoverTracker::new(&PipelineOptions::default());
        let t0 = Instant::now();

        let entered = tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, t0);
        assert!(matches!(entered, Some(HoverTransition::Entered(ref m)) if m.id == 1));

        // still over the same marker: nothing
        assert_eq!(
            tracker.on_pointer_move_at(Point::new(503.0, 501.0), &view(), &index, t0 + ms(60)),
            None
        );

        let left = tracker.on_pointer_move_at(Point::new(700.0, 700.0), &view(), &index, t0 + ms(120));
        assert!(matches!(left, Some(HoverTransition::Left(ref m)) if m.id == 1));
        assert!(tracker.hovered().is_none());

        assert_eq!(
            tracker.on_pointer_move_at(Point::new(710.0, 700.0), &view(), &index, t0 + ms(180)),
            None
        );
    }

    #[test]
    fn test_moves_inside_interval_are_ignored() {
        let index = index();
        let mut tracker = HoverTracker::new(&PipelineOptions::default());
        let t0 = Instant::now();

        assert_eq!(
            tracker.on_pointer_move_at(Point::new(10.0, 10.0), &view(), &index, t0),
            None
        );
        // over a marker, but only 20ms later
        assert_eq!(
            tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, t0 + ms(20)),
            None
        );
        assert!(tracker.hovered().is_none());

        assert!(tracker
            .on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, t0 + ms(50))
            .is_some());
    }

    #[test]
    fn test_switch_between_markers() {
        let index = index();
        let mut tracker = HoverTracker::new(&PipelineOptions::default());
        let t0 = Instant::now();

        tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, t0);
        let switched = tracker.on_pointer_move_at(Point::new(250.0, 500.0), &view(), &index, t0 + ms(50));

        match switched {
            Some(HoverTransition::Switched { left, entered }) => {
                assert_eq!(left.id, 1);
                assert_eq!(entered.id, 2);
            }
            other => panic!("unexpected transition {:?}", other),
        }
        assert_eq!(tracker.hovered().map(|m| m.id), Some(2));
    }

    #[test]
    fn test_pointer_leave_and_reset() {
        let index = index();
        let mut tracker = HoverTracker::new(&PipelineOptions::default());

        assert_eq!(tracker.on_pointer_leave(), None);
        tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, Instant::now());
        assert!(matches!(tracker.on_pointer_leave(), Some(HoverTransition::Left(_))));
        assert_eq!(tracker.on_pointer_leave(), None);

        tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, Instant::now());
        assert!(matches!(tracker.reset(), Some(HoverTransition::Left(ref m)) if m.id == 1));
        assert!(tracker.hovered().is_none());
        assert_eq!(tracker.reset(), None);
        assert_eq!(tracker.on_pointer_leave(), None);
    }

    #[test]
    fn test_release_only_matching_marker() {
        let index = index();
        let mut tracker = HoverTracker::new(&PipelineOptions::default());
        tracker.on_pointer_move_at(Point::new(500.0, 500.0), &view(), &index, Instant::now());

        assert_eq!(tracker.release_if(|m| m.id == 2), None);
        assert_eq!(tracker.hovered().map(|m| m.id), Some(1));

        assert!(matches!(tracker.release_if(|m| m.id == 1), Some(HoverTransition::Left(ref m)) if m.id == 1));
        assert!(tracker.hovered().is_none());
        assert_eq!(tracker.release_if(|_| true), None);
    }
}
