//! Throttled marker redisplay.
//!
//! Isolated requests are applied immediately. Requests arriving within the
//! minimum apply interval of the previous apply overwrite a single pending
//! slot and re-arm one deferred apply, so a burst of pan/zoom events converges
//! on its last state with at most one follow-up redraw. Deferred applies are
//! driven by the host event loop calling [`RenderScheduler::tick`].
//!
//! The scheduler belongs to one thread: its state lives in `Cell`/`RefCell`
//! and the `is_applying` guard is a plain flag. A request issued while a pass
//! is being applied (for example from inside the renderer) is dropped.

use crate::{
    core::{
        calibration::MapCalibration,
        config::{PipelineOptions, SchedulerConfig, Verbosity},
        view::View,
    },
    markers::marker::MarkerSet,
    rendering::pipeline::{MarkerRenderer, RenderPipeline},
};
use std::cell::{Cell, Ref, RefCell};
use std::sync::Arc;
use std::time::Instant;

/// One "redisplay markers" request
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRequest {
    pub markers: Arc<MarkerSet>,
    pub map_id: u32,
    pub view: View,
    pub calibration: MapCalibration,
}

impl DisplayRequest {
    pub fn new(markers: Arc<MarkerSet>, view: View, calibration: MapCalibration) -> Self {
        Self {
            map_id: markers.map_id,
            markers,
            view,
            calibration,
        }
    }
}

/// What happened to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOutcome {
    /// Rendered right away
    Applied,
    /// Parked in the pending slot until the deferred apply fires
    Deferred,
    /// Arrived while a pass was being applied
    Dropped,
}

pub struct RenderScheduler<R: MarkerRenderer> {
    pipeline: RenderPipeline,
    renderer: RefCell<R>,
    config: SchedulerConfig,
    verbosity: Verbosity,
    last_applied: Cell<Option<Instant>>,
    pending: RefCell<Option<DisplayRequest>>,
    deferred_due: Cell<Option<Instant>>,
    is_applying: Cell<bool>,
    applied_count: Cell<u64>,
}

impl<R: MarkerRenderer> RenderScheduler<R> {
    pub fn new(options: &PipelineOptions, renderer: R) -> Self {
        Self {
            pipeline: RenderPipeline::new(options),
            renderer: RefCell::new(renderer),
            config: options.scheduler.clone(),
            verbosity: options.verbosity,
            last_applied: Cell::new(None),
            pending: RefCell::new(None),
            deferred_due: Cell::new(None),
            is_applying: Cell::new(false),
            applied_count: Cell::new(0),
        }
    }

    pub fn request_display(&self, request: DisplayRequest) -> DisplayOutcome {
        self.request_display_at(request, Instant::now())
    }

    pub fn request_display_at(&self, request: DisplayRequest, now: Instant) -> DisplayOutcome {
        if self.is_applying.get() {
            if self.verbosity.is_verbose() {
                log::debug!("display request for map {} dropped: apply in flight", request.map_id);
            }
            return DisplayOutcome::Dropped;
        }

        let throttled = self
            .last_applied
            .get()
            .map(|last| now.saturating_duration_since(last) < self.config.min_apply_interval())
            .unwrap_or(false);

        if throttled {
            // last writer wins; intermediate states are never drawn
            *self.pending.borrow_mut() = Some(request);
            self.deferred_due.set(Some(now + self.config.deferred_delay()));
            return DisplayOutcome::Deferred;
        }

        self.pending.borrow_mut().take();
        self.deferred_due.set(None);
        self.apply(request, now);
        DisplayOutcome::Applied
    }

    pub fn tick(&self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Fires the deferred apply if it is due. Returns whether a pass ran.
    pub fn tick_at(&self, now: Instant) -> bool {
        if self.is_applying.get() {
            return false;
        }
        match self.deferred_due.get() {
            Some(due) if now >= due => {
                self.deferred_due.set(None);
                let request = self.pending.borrow_mut().take();
                match request {
                    Some(request) => {
                        self.apply(request, now);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// When the host loop should call [`Self::tick`] next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred_due.get()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn is_applying(&self) -> bool {
        self.is_applying.get()
    }

    pub fn applied_count(&self) -> u64 {
        self.applied_count.get()
    }

    pub fn last_applied(&self) -> Option<Instant> {
        self.last_applied.get()
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        self.renderer.borrow()
    }

    fn apply(&self, request: DisplayRequest, now: Instant) {
        self.is_applying.set(true);
        let _applying = ApplyingGuard(&self.is_applying);

        let frame = self.pipeline.build_frame(
            request.map_id,
            &request.markers,
            &request.calibration,
            &request.view,
        );
        if self.verbosity.is_verbose() {
            log::debug!(
                "applying {} markers for map {} at scale {:.3}",
                frame.markers.len(),
                frame.map_id,
                frame.view.scale
            );
        }
        self.renderer.borrow_mut().render(&frame);

        self.last_applied.set(Some(now));
        self.applied_count.set(self.applied_count.get() + 1);
    }
}

/// Clears `is_applying` on the way out of an apply, unwinding included
struct ApplyingGuard<'a>(&'a Cell<bool>);

impl Drop for ApplyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{Point, Size};
    use crate::markers::marker::{MapMarker, MarkerTier};
    use crate::rendering::pipeline::MarkerFrame;
    use std::rc::{Rc, Weak};
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<MarkerFrame>,
    }

    impl MarkerRenderer for Recorder {
        fn render(&mut self, frame: &MarkerFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn request(scale: f64) -> DisplayRequest {
        let set = MarkerSet::new(
            3,
            MarkerTier::Primary,
            vec![MapMarker::new(1, 3, 21.5, 21.5, 60453)],
        );
        DisplayRequest::new(
            Arc::new(set),
            View::new(scale, Point::default(), Size::square(1024.0)),
            MapCalibration::default(),
        )
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_isolated_requests_apply_immediately() {
        let scheduler = RenderScheduler::new(&PipelineOptions::default(), Recorder::default());
        let t0 = Instant::now();

        assert_eq!(scheduler.request_display_at(request(1.0), t0), DisplayOutcome::Applied);
        assert_eq!(
            scheduler.request_display_at(request(2.0), t0 + ms(400)),
            DisplayOutcome::Applied
        );
        assert_eq!(scheduler.applied_count(), 2);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_burst_converges_to_last_request() {
        let scheduler = RenderScheduler::new(&PipelineOptions::default(), Recorder::default());
        let t0 = Instant::now();

        let outcomes: Vec<_> = (0..10)
            .map(|i| scheduler.request_display_at(request(1.0 + i as f64), t0 + ms(i * 5)))
            .collect();

        assert_eq!(outcomes[0], DisplayOutcome::Applied);
        assert!(outcomes[1..].iter().all(|o| *o == DisplayOutcome::Deferred));
        assert_eq!(scheduler.applied_count(), 1);

        // re-armed by the last request at t0 + 45ms
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(245)));
        assert!(!scheduler.tick_at(t0 + ms(200)));
        assert!(scheduler.tick_at(t0 + ms(245)));
        assert!(!scheduler.tick_at(t0 + ms(1000)));

        let renderer = scheduler.renderer();
        assert_eq!(renderer.frames.len(), 2);
        assert_eq!(renderer.frames[1].view.scale, 10.0);
    }

    #[test]
    fn test_immediate_apply_discards_stale_pending() {
        let scheduler = RenderScheduler::new(&PipelineOptions::default(), Recorder::default());
        let t0 = Instant::now();

        scheduler.request_display_at(request(1.0), t0);
        scheduler.request_display_at(request(2.0), t0 + ms(100));
        assert!(scheduler.has_pending());

        // the deferred apply was never ticked; a later request goes straight through
        assert_eq!(
            scheduler.request_display_at(request(3.0), t0 + ms(500)),
            DisplayOutcome::Applied
        );
        assert!(!scheduler.has_pending());
        assert!(!scheduler.tick_at(t0 + ms(2000)));
        assert_eq!(scheduler.renderer().frames.last().unwrap().view.scale, 3.0);
    }

    #[test]
    fn test_deferred_apply_resets_throttle_window() {
        let scheduler = RenderScheduler::new(&PipelineOptions::default(), Recorder::default());
        let t0 = Instant::now();

        scheduler.request_display_at(request(1.0), t0);
        scheduler.request_display_at(request(2.0), t0 + ms(10));
        assert!(scheduler.tick_at(t0 + ms(210)));
        assert_eq!(scheduler.last_applied(), Some(t0 + ms(210)));

        assert_eq!(
            scheduler.request_display_at(request(3.0), t0 + ms(400)),
            DisplayOutcome::Deferred
        );
    }

    #[test]
    fn test_panicking_renderer_releases_apply_guard() {
        let calls = Rc::new(Cell::new(0u32));
        let seen = calls.clone();
        let scheduler = RenderScheduler::new(&PipelineOptions::default(), move |_frame: &MarkerFrame| {
            seen.set(seen.get() + 1);
            if seen.get() == 1 {
                panic!("renderer failed");
            }
        });
        let t0 = Instant::now();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scheduler.request_display_at(request(1.0), t0)
        }));
        assert!(result.is_err());
        assert!(!scheduler.is_applying());

        // the failed pass never counted as applied, so nothing throttles this one
        assert_eq!(scheduler.request_display_at(request(2.0), t0), DisplayOutcome::Applied);
        assert_eq!(calls.get(), 2);
        assert_eq!(scheduler.applied_count(), 1);
    }

    struct Reentrant {
        scheduler: Weak<RenderScheduler<Reentrant>>,
        outcomes: Vec<DisplayOutcome>,
    }

    impl MarkerRenderer for Reentrant {
        fn render(&mut self, _frame: &MarkerFrame) {
            if let Some(scheduler) = self.scheduler.upgrade() {
                assert!(scheduler.is_applying());
                self.outcomes.push(scheduler.request_display(request(5.0)));
            }
        }
    }

    #[test]
    fn test_requests_during_apply_are_dropped() {
        let scheduler = Rc::new_cyclic(|weak| {
            RenderScheduler::new(
                &PipelineOptions::default(),
                Reentrant {
                    scheduler: weak.clone(),
                    outcomes: Vec::new(),
                },
            )
        });

        assert_eq!(scheduler.request_display(request(1.0)), DisplayOutcome::Applied);
        assert_eq!(scheduler.renderer().outcomes, vec![DisplayOutcome::Dropped]);
        assert!(!scheduler.is_applying());
        assert!(!scheduler.has_pending());
    }
}
