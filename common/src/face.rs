//! Watch face session.
//!
//! [`WatchFace`] owns every component and is the only thing a platform talks
//! to. The platform forwards [`HostEvent`]s into [`WatchFace::dispatch`]
//! together with its draw target; the session runs the scheduler transition,
//! applies the resulting [`Actions`] against the [`Host`] and draws when
//! asked to. Nothing is returned to the platform: failures are logged into
//! the session's [`LogBuffer`] and the face carries on.
//!
//! Dropping the session (or calling [`WatchFace::shutdown`]) cancels the
//! pending tick before the host can fire it.

use core::fmt;
use core::time::Duration;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::assets::{AssetPipeline, SourceAssets};
use crate::clock::ClockSource;
use crate::config::FaceLayout;
use crate::feeds::DataFeeds;
use crate::geometry::{DisplayShape, RingFrame, compute_ring_paths};
use crate::profiling::LogBuffer;
use crate::render::{FrameError, FrameInput, draw_frame};
use crate::scheduler::{Actions, HostEvent, RenderScheduler, SchedulerState, TickCommand};
use crate::style::StyleState;
use crate::{log_debug, log_error, log_info, log_trace, log_warn};

// =============================================================================
// Host Interface
// =============================================================================

/// Services the platform provides to the session.
///
/// Every method is fire-and-forget. Requests for external data are answered
/// later by publishing into the shared [`DataFeeds`].
pub trait Host {
    /// Wall-clock time, Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current local offset from UTC in seconds.
    fn utc_offset_secs(&self) -> i32;

    /// Fire [`HostEvent::TickFired`] with `generation` after `delay`.
    fn schedule_tick(
        &mut self,
        delay: Duration,
        generation: u32,
    );

    /// Drop the pending tick, if any. Must be idempotent.
    fn cancel_tick(&mut self);

    /// Ask for a fresh watch battery reading and step count.
    fn request_battery(&mut self);

    /// Ask the paired phone for its battery level and the temperature.
    fn request_companion(&mut self);

    /// Start or stop delivering [`HostEvent::TimeZoneChanged`].
    fn set_time_zone_subscription(
        &mut self,
        subscribed: bool,
    );
}

// =============================================================================
// Session
// =============================================================================

pub struct WatchFace<'f, H: Host> {
    host: H,
    feeds: &'f DataFeeds,
    shape: DisplayShape,
    scheduler: RenderScheduler,
    clock: ClockSource,
    style: StyleState,
    assets: AssetPipeline,
    frame: Option<RingFrame>,
    layout: Option<FaceLayout>,
    log: LogBuffer,
    frames_drawn: u32,
    frames_failed: u32,
}

impl<'f, H: Host> WatchFace<'f, H> {
    pub fn new(
        host: H,
        feeds: &'f DataFeeds,
        shape: DisplayShape,
        source: SourceAssets,
    ) -> Self {
        let clock = ClockSource::new(host.utc_offset_secs());
        Self {
            host,
            feeds,
            shape,
            scheduler: RenderScheduler::new(),
            clock,
            style: StyleState::default(),
            assets: AssetPipeline::new(source),
            frame: None,
            layout: None,
            log: LogBuffer::new(),
            frames_drawn: 0,
            frames_failed: 0,
        }
    }

    #[inline]
    pub fn host(&self) -> &H { &self.host }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    #[inline]
    pub fn log(&self) -> &LogBuffer { &self.log }

    #[inline]
    pub fn log_mut(&mut self) -> &mut LogBuffer { &mut self.log }

    #[inline]
    pub fn state(&self) -> SchedulerState { self.scheduler.state() }

    #[inline]
    pub fn scheduler(&self) -> &RenderScheduler { &self.scheduler }

    #[inline]
    pub fn style(&self) -> &StyleState { &self.style }

    #[inline]
    pub fn clock(&self) -> &ClockSource { &self.clock }

    #[inline]
    pub fn assets(&self) -> &AssetPipeline { &self.assets }

    #[inline]
    pub fn layout(&self) -> Option<&FaceLayout> { self.layout.as_ref() }

    #[inline]
    pub const fn frames_drawn(&self) -> u32 { self.frames_drawn }

    #[inline]
    pub const fn frames_failed(&self) -> u32 { self.frames_failed }

    /// Feed one host notification through the scheduler and act on it.
    pub fn dispatch<D>(
        &mut self,
        event: HostEvent,
        target: &mut D,
    ) where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let now = self.host.now_ms();
        let before = self.scheduler.state();
        let actions = self.scheduler.handle(event, now);

        let after = self.scheduler.state();
        if after != before {
            log_info!(self.log, stamp(now), "{:?} -> {:?}", before, after);
        }

        if let HostEvent::TimeZoneChanged { utc_offset_secs } = event {
            if self.clock.set_utc_offset(utc_offset_secs) {
                log_debug!(self.log, stamp(now), "utc offset {}s", utc_offset_secs);
            }
        } else if actions.resync_time_zone {
            self.clock.set_utc_offset(self.host.utc_offset_secs());
        }

        self.apply(actions, now, target);
    }

    /// Cancel the pending tick and release the time-zone subscription.
    pub fn shutdown(&mut self) {
        let cmd = self.scheduler.cancel();
        self.apply_tick(cmd);
        if self.scheduler.is_subscribed() {
            // Invisible releases the subscription through the normal path.
            let actions = self.scheduler.handle(HostEvent::VisibilityChanged(false), self.host.now_ms());
            if let Some(subscribed) = actions.time_zone_subscription {
                self.host.set_time_zone_subscription(subscribed);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Action application
    // -------------------------------------------------------------------------

    fn apply<D>(
        &mut self,
        actions: Actions,
        now: i64,
        target: &mut D,
    ) where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        if let Some(subscribed) = actions.time_zone_subscription {
            self.host.set_time_zone_subscription(subscribed);
        }

        if actions.relayout {
            self.relayout();
        }

        if actions.restyle {
            self.style.set_mode(self.scheduler.mode());
        }

        if actions.rebuild_assets {
            self.rebuild_assets(now);
        }

        if actions.select_ambient_assets && self.assets.ensure_desaturated() {
            log_debug!(self.log, stamp(now), "generated ambient icons");
        }

        if actions.request_battery {
            self.host.request_battery();
        }
        if actions.request_companion {
            self.host.request_companion();
        }

        let mut tick = actions.tick;
        if actions.redraw {
            self.redraw(target, now);
            tick = tick.then(self.scheduler.after_redraw(now));
        }
        self.apply_tick(tick);
    }

    fn apply_tick(
        &mut self,
        cmd: TickCommand,
    ) {
        match cmd {
            TickCommand::Keep => {}
            TickCommand::Cancel => self.host.cancel_tick(),
            TickCommand::Arm { delay, generation } => {
                self.host.cancel_tick();
                self.host.schedule_tick(delay, generation);
            }
        }
    }

    fn relayout(&mut self) {
        if let Some(size) = self.scheduler.surface() {
            self.frame = Some(RingFrame::for_surface(size, self.shape));
            self.layout = Some(FaceLayout::for_surface(size, self.shape));
        }
    }

    fn rebuild_assets(
        &mut self,
        now: i64,
    ) {
        let Some(size) = self.scheduler.surface() else {
            return;
        };
        let mode = self.scheduler.mode();
        match self.assets.rebuild(size, mode.needs_desaturated_assets()) {
            Ok(()) => {
                if mode.ambient {
                    self.assets.ensure_desaturated();
                }
                log_debug!(self.log, stamp(now), "assets {}x{}", size.width, size.height);
            }
            Err(e) => {
                log_warn!(self.log, stamp(now), "assets kept: {}", e);
            }
        }
    }

    fn redraw<D>(
        &mut self,
        target: &mut D,
        now: i64,
    ) where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let result = match (self.frame.as_ref(), self.layout.as_ref()) {
            (Some(frame), Some(layout)) => {
                let reading = self.clock.read(now);
                let paths = compute_ring_paths(reading.progress, self.shape, self.scheduler.inset(), frame);
                let input = FrameInput {
                    reading: &reading,
                    paths: &paths,
                    style: &self.style,
                    layout,
                    assets: &self.assets,
                    feeds: self.feeds.snapshot(),
                };
                draw_frame(target, &input)
            }
            _ => Err(FrameError::NoSurface),
        };

        match result {
            Ok(()) => {
                self.frames_drawn = self.frames_drawn.wrapping_add(1);
                log_trace!(self.log, stamp(now), "frame {}", self.frames_drawn);
            }
            Err(e) => {
                self.frames_failed = self.frames_failed.wrapping_add(1);
                log_error!(self.log, stamp(now), "frame failed: {}", e);
            }
        }
    }
}

impl<H: Host> Drop for WatchFace<'_, H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Log timestamp for an epoch time.
#[inline]
fn stamp(now: i64) -> u64 {
    now.max(0) as u64
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetName, Bitmap};
    use crate::colors::{BLACK, CYAN};
    use crate::geometry::InsetGeometry;
    use crate::profiling::LogLevel;
    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    const T0: i64 = 1_709_557_662_250;
    const SIZE: Size = Size::new(240, 240);

    #[derive(Default)]
    struct HostRecord {
        now: i64,
        offset: i32,
        outstanding: Option<u32>,
        scheduled: Vec<(Duration, u32)>,
        cancels: usize,
        battery_requests: usize,
        companion_requests: usize,
        subscribed: bool,
    }

    #[derive(Clone)]
    struct FakeHost(Rc<RefCell<HostRecord>>);

    impl FakeHost {
        fn new() -> Self {
            Self(Rc::new(RefCell::new(HostRecord {
                now: T0,
                ..HostRecord::default()
            })))
        }

        fn advance(
            &self,
            ms: i64,
        ) {
            self.0.borrow_mut().now += ms;
        }

        fn outstanding(&self) -> Option<u32> {
            self.0.borrow().outstanding
        }
    }

    impl Host for FakeHost {
        fn now_ms(&self) -> i64 { self.0.borrow().now }

        fn utc_offset_secs(&self) -> i32 { self.0.borrow().offset }

        fn schedule_tick(
            &mut self,
            delay: Duration,
            generation: u32,
        ) {
            let mut rec = self.0.borrow_mut();
            assert!(rec.outstanding.is_none(), "Previous tick must be cancelled first");
            rec.outstanding = Some(generation);
            rec.scheduled.push((delay, generation));
        }

        fn cancel_tick(&mut self) {
            let mut rec = self.0.borrow_mut();
            rec.outstanding = None;
            rec.cancels += 1;
        }

        fn request_battery(&mut self) {
            self.0.borrow_mut().battery_requests += 1;
        }

        fn request_companion(&mut self) {
            self.0.borrow_mut().companion_requests += 1;
        }

        fn set_time_zone_subscription(
            &mut self,
            subscribed: bool,
        ) {
            self.0.borrow_mut().subscribed = subscribed;
        }
    }

    /// Counts pixels; optionally rejects everything.
    struct CountingTarget {
        pixels: usize,
        broken: bool,
    }

    impl CountingTarget {
        fn new() -> Self {
            Self { pixels: 0, broken: false }
        }
    }

    impl OriginDimensions for CountingTarget {
        fn size(&self) -> Size { SIZE }
    }

    impl DrawTarget for CountingTarget {
        type Color = Rgb565;
        type Error = ();

        fn draw_iter<I>(
            &mut self,
            pixels: I,
        ) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            if self.broken {
                return Err(());
            }
            self.pixels += pixels.into_iter().count();
            Ok(())
        }
    }

    fn sources() -> SourceAssets {
        SourceAssets::new()
            .with(AssetName::Background, Bitmap::filled(240, 240, BLACK))
            .with(AssetName::Calendar, Bitmap::filled(80, 80, CYAN))
            .with(AssetName::Steps, Bitmap::filled(80, 80, CYAN))
    }

    fn started<'f>(
        host: &FakeHost,
        feeds: &'f DataFeeds,
        target: &mut CountingTarget,
    ) -> WatchFace<'f, FakeHost> {
        let mut face = WatchFace::new(host.clone(), feeds, DisplayShape::Round, sources());
        face.dispatch(HostEvent::SurfaceChanged(SIZE), target);
        face.dispatch(HostEvent::VisibilityChanged(true), target);
        face
    }

    #[test]
    fn test_startup_draws_and_arms_one_tick() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let face = started(&host, &feeds, &mut target);

        assert_eq!(face.state(), SchedulerState::InteractiveVisible);
        assert_eq!(face.frames_drawn(), 1);
        assert!(target.pixels > 0);

        let rec = host.0.borrow();
        assert!(rec.outstanding.is_some());
        assert_eq!(rec.scheduled.len(), 1, "Exactly one schedule call");
        let (delay, _) = rec.scheduled[0];
        assert!(delay > Duration::ZERO && delay <= Duration::from_secs(1));
        assert!(rec.subscribed);
    }

    #[test]
    fn test_tick_loop_rearms_and_ignores_stale() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let mut face = started(&host, &feeds, &mut target);

        let first = host.outstanding().unwrap();
        host.advance(750);
        face.dispatch(HostEvent::TickFired { generation: first }, &mut target);
        assert_eq!(face.frames_drawn(), 2);

        let second = host.outstanding().unwrap();
        assert_ne!(first, second);
        assert_eq!(host.0.borrow().scheduled.last().map(|s| s.0), Some(Duration::from_secs(1)));

        face.dispatch(HostEvent::TickFired { generation: first }, &mut target);
        assert_eq!(face.frames_drawn(), 2, "Stale tick draws nothing");
        assert_eq!(host.outstanding(), Some(second));
    }

    #[test]
    fn test_ambient_cancels_and_keeps_drawing_on_time_tick() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let mut face = started(&host, &feeds, &mut target);

        face.dispatch(HostEvent::AmbientModeChanged(true), &mut target);
        assert_eq!(face.state(), SchedulerState::AmbientVisible);
        assert_eq!(host.outstanding(), None);
        assert!(face.style().mode().ambient);
        assert!(face.assets().current().unwrap().has_desaturated());

        let drawn = face.frames_drawn();
        face.dispatch(HostEvent::TimeTick, &mut target);
        assert_eq!(face.frames_drawn(), drawn + 1);
        assert_eq!(host.outstanding(), None, "Time tick never reschedules");

        face.dispatch(HostEvent::AmbientModeChanged(false), &mut target);
        assert!(host.outstanding().is_some());
        assert_eq!(host.0.borrow().battery_requests, 1);
        assert_eq!(host.0.borrow().companion_requests, 1);
    }

    #[test]
    fn test_failed_frame_is_logged_and_rearmed() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let mut face = started(&host, &feeds, &mut target);

        let generation = host.outstanding().unwrap();
        target.broken = true;
        face.dispatch(HostEvent::TickFired { generation }, &mut target);

        assert_eq!(face.frames_failed(), 1);
        assert!(host.outstanding().is_some(), "Failed frame still re-arms");
        let last = face.log().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.starts_with("frame failed"));
    }

    #[test]
    fn test_visible_before_surface_logs_no_surface() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let mut face = WatchFace::new(host.clone(), &feeds, DisplayShape::Round, sources());
        face.dispatch(HostEvent::VisibilityChanged(true), &mut target);

        assert_eq!(face.frames_failed(), 1);
        assert!(face.log().iter().any(|e| e.message.contains("no surface")));
        assert!(host.outstanding().is_some());
    }

    #[test]
    fn test_asset_failure_keeps_drawing() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let source = SourceAssets::new().with(AssetName::Background, Bitmap::filled(10, 10, BLACK));
        let mut face = WatchFace::new(host.clone(), &feeds, DisplayShape::Round, source);

        face.dispatch(HostEvent::SurfaceChanged(SIZE), &mut target);
        face.dispatch(HostEvent::VisibilityChanged(true), &mut target);

        assert!(face.assets().current().is_none());
        assert!(face.log().iter().any(|e| e.level == LogLevel::Warn));
        assert_eq!(face.frames_drawn(), 1);
    }

    #[test]
    fn test_hidden_cancels_and_unsubscribes() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let mut face = started(&host, &feeds, &mut target);

        face.dispatch(HostEvent::VisibilityChanged(false), &mut target);
        assert_eq!(host.outstanding(), None);
        assert!(!host.0.borrow().subscribed);
        assert_eq!(face.frames_drawn(), 1);
    }

    #[test]
    fn test_time_zone_updates_clock() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        host.0.borrow_mut().offset = -3600;
        let mut face = started(&host, &feeds, &mut target);
        assert_eq!(face.clock().utc_offset_secs(), -3600, "Resynced on show");

        face.dispatch(HostEvent::TimeZoneChanged { utc_offset_secs: 7200 }, &mut target);
        assert_eq!(face.clock().utc_offset_secs(), 7200);
        assert_eq!(face.frames_drawn(), 2);
    }

    #[test]
    fn test_inset_changes_ring_without_failing() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        feeds.publish_battery(55);
        let mut target = CountingTarget::new();
        let mut face = started(&host, &feeds, &mut target);

        face.dispatch(HostEvent::InsetsChanged(InsetGeometry::new(24.0)), &mut target);
        assert_eq!(face.frames_drawn(), 2);
        assert_eq!(face.frames_failed(), 0);
    }

    #[test]
    fn test_drop_cancels_pending_tick() {
        let host = FakeHost::new();
        let feeds = DataFeeds::new();
        let mut target = CountingTarget::new();
        let face = started(&host, &feeds, &mut target);
        assert!(host.outstanding().is_some());

        drop(face);
        assert_eq!(host.outstanding(), None);
        assert!(!host.0.borrow().subscribed);
    }
}
