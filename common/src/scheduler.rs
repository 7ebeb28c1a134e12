//! Render scheduler: the visibility / ambient state machine.
//!
//! ```text
//!                 visible(true), !ambient
//!   ┌───────────┐ ───────────────────────▶ ┌────────────────────┐
//!   │ Invisible │                          │ InteractiveVisible │ ◀─┐ tick every
//!   └───────────┘ ◀─────────────────────── └────────────────────┘ ──┘ second
//!        ▲  │       visible(false)            │            ▲
//!        │  │                      ambient(on)│            │ambient(off)
//!        │  │ visible(true), ambient          ▼            │
//!        │  └────────────────────────▶ ┌────────────────────┐
//!        └──────────────────────────── │   AmbientVisible   │  redraw on
//!                  visible(false)      └────────────────────┘  TimeTick only
//! ```
//!
//! [`RenderScheduler::handle`] is a pure transition: it mutates only the
//! scheduler's own bookkeeping and returns an [`Actions`] value describing
//! what the session must do. At most one tick is ever outstanding; every arm
//! supersedes the previous one and carries a fresh generation, so a tick that
//! fires late for an old generation is ignored.

use core::time::Duration;

use embedded_graphics::geometry::Size;

use crate::clock::delay_to_next_update;
use crate::config::{COMPANION_REQUEST_INTERVAL_MS, UPDATE_RATE_MS};
use crate::geometry::InsetGeometry;
use crate::style::DisplayMode;

// =============================================================================
// Types
// =============================================================================

/// Where the face is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    Invisible,
    InteractiveVisible,
    AmbientVisible,
}

/// Notifications pushed by the host platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged {
        low_bit_ambient: bool,
        burn_in_protection: bool,
    },
    InterruptionFilterChanged {
        muted: bool,
    },
    InsetsChanged(InsetGeometry),
    SurfaceChanged(Size),
    TimeZoneChanged {
        utc_offset_secs: i32,
    },
    /// Once-per-minute heartbeat, delivered in every visible mode.
    TimeTick,
    /// A previously armed tick fired.
    TickFired {
        generation: u32,
    },
}

/// What to do with the pending tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickCommand {
    /// Leave whatever is pending alone.
    Keep,
    /// Cancel the pending tick, if any.
    Cancel,
    /// Cancel the pending tick, then schedule this one.
    Arm { delay: Duration, generation: u32 },
}

impl TickCommand {
    /// Combine two commands issued in sequence; the later one wins unless it
    /// is [`TickCommand::Keep`].
    #[must_use]
    pub const fn then(
        self,
        next: Self,
    ) -> Self {
        match next {
            Self::Keep => self,
            other => other,
        }
    }
}

/// Side effects requested by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actions {
    pub redraw: bool,
    pub tick: TickCommand,
    pub request_battery: bool,
    pub request_companion: bool,
    /// Re-derive paints from the current [`DisplayMode`].
    pub restyle: bool,
    /// Regenerate the asset set (surface size or capability change).
    pub rebuild_assets: bool,
    /// Make sure grayscale icons exist before the next ambient frame.
    pub select_ambient_assets: bool,
    /// Recompute the ring frame and text layout.
    pub relayout: bool,
    /// `Some(true)` to subscribe to time-zone changes, `Some(false)` to release.
    pub time_zone_subscription: Option<bool>,
    /// Re-read the UTC offset from the host.
    pub resync_time_zone: bool,
}

impl Actions {
    pub const NONE: Self = Self {
        redraw: false,
        tick: TickCommand::Keep,
        request_battery: false,
        request_companion: false,
        restyle: false,
        rebuild_assets: false,
        select_ambient_assets: false,
        relayout: false,
        time_zone_subscription: None,
        resync_time_zone: false,
    };

    #[inline]
    pub fn is_none(&self) -> bool { *self == Self::NONE }
}

impl Default for Actions {
    fn default() -> Self { Self::NONE }
}

// =============================================================================
// Scheduler
// =============================================================================

#[derive(Clone, Debug)]
pub struct RenderScheduler {
    visible: bool,
    mode: DisplayMode,
    inset: InsetGeometry,
    surface: Option<Size>,
    generation: u32,
    pending: Option<u32>,
    subscribed: bool,
    last_companion_request_ms: Option<i64>,
}

impl RenderScheduler {
    pub const fn new() -> Self {
        Self {
            visible: false,
            mode: DisplayMode::new(),
            inset: InsetGeometry::NONE,
            surface: None,
            generation: 0,
            pending: None,
            subscribed: false,
            last_companion_request_ms: None,
        }
    }

    pub const fn state(&self) -> SchedulerState {
        match (self.visible, self.mode.ambient) {
            (false, _) => SchedulerState::Invisible,
            (true, false) => SchedulerState::InteractiveVisible,
            (true, true) => SchedulerState::AmbientVisible,
        }
    }

    #[inline]
    pub const fn mode(&self) -> DisplayMode { self.mode }

    #[inline]
    pub const fn inset(&self) -> InsetGeometry { self.inset }

    #[inline]
    pub const fn surface(&self) -> Option<Size> { self.surface }

    /// Generation of the outstanding tick, if one is armed.
    #[inline]
    pub const fn pending_tick(&self) -> Option<u32> { self.pending }

    #[inline]
    pub const fn is_subscribed(&self) -> bool { self.subscribed }

    /// Apply one host notification.
    pub fn handle(
        &mut self,
        event: HostEvent,
        now_ms: i64,
    ) -> Actions {
        match event {
            HostEvent::VisibilityChanged(visible) => self.on_visibility(visible, now_ms),
            HostEvent::AmbientModeChanged(ambient) => self.on_ambient(ambient, now_ms),
            HostEvent::PropertiesChanged {
                low_bit_ambient,
                burn_in_protection,
            } => self.on_properties(low_bit_ambient, burn_in_protection),
            HostEvent::InterruptionFilterChanged { muted } => self.on_mute(muted),
            HostEvent::InsetsChanged(inset) => self.on_insets(inset),
            HostEvent::SurfaceChanged(size) => self.on_surface(size),
            HostEvent::TimeZoneChanged { .. } => Actions {
                resync_time_zone: true,
                redraw: self.visible,
                ..Actions::NONE
            },
            HostEvent::TimeTick => Actions {
                redraw: self.visible,
                ..Actions::NONE
            },
            HostEvent::TickFired { generation } => self.on_tick(generation),
        }
    }

    /// Tick command to apply once a redraw pass has finished, whether or not
    /// it succeeded.
    pub fn after_redraw(
        &mut self,
        now_ms: i64,
    ) -> TickCommand {
        self.rearm(now_ms)
    }

    /// Forget the pending tick. Used when the session shuts down.
    pub fn cancel(&mut self) -> TickCommand {
        self.pending = None;
        TickCommand::Cancel
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn on_visibility(
        &mut self,
        visible: bool,
        now_ms: i64,
    ) -> Actions {
        if visible == self.visible {
            return Actions::NONE;
        }
        self.visible = visible;

        if visible {
            let subscribe = !self.subscribed;
            self.subscribed = true;
            Actions {
                redraw: true,
                tick: self.rearm(now_ms),
                resync_time_zone: true,
                time_zone_subscription: subscribe.then_some(true),
                ..Actions::NONE
            }
        } else {
            let release = self.subscribed;
            self.subscribed = false;
            Actions {
                tick: self.cancel(),
                time_zone_subscription: release.then_some(false),
                ..Actions::NONE
            }
        }
    }

    fn on_ambient(
        &mut self,
        ambient: bool,
        now_ms: i64,
    ) -> Actions {
        if ambient == self.mode.ambient {
            return Actions::NONE;
        }
        self.mode.ambient = ambient;

        let mut actions = Actions {
            restyle: true,
            redraw: self.visible,
            tick: self.rearm(now_ms),
            select_ambient_assets: ambient,
            ..Actions::NONE
        };

        if !ambient {
            actions.request_battery = true;
            actions.request_companion = self.companion_due(now_ms);
        }
        actions
    }

    fn on_properties(
        &mut self,
        low_bit_ambient: bool,
        burn_in_protection: bool,
    ) -> Actions {
        let before = self.mode;
        self.mode.low_bit_ambient = low_bit_ambient;
        self.mode.burn_in_protection = burn_in_protection;

        if self.mode == before {
            return Actions::NONE;
        }
        Actions {
            restyle: true,
            rebuild_assets: self.mode.needs_desaturated_assets()
                != before.needs_desaturated_assets(),
            ..Actions::NONE
        }
    }

    fn on_mute(
        &mut self,
        muted: bool,
    ) -> Actions {
        if muted == self.mode.muted {
            return Actions::NONE;
        }
        self.mode.muted = muted;
        Actions {
            restyle: true,
            redraw: self.visible,
            ..Actions::NONE
        }
    }

    fn on_insets(
        &mut self,
        inset: InsetGeometry,
    ) -> Actions {
        if inset == self.inset {
            return Actions::NONE;
        }
        self.inset = inset;
        Actions {
            relayout: true,
            redraw: self.visible,
            ..Actions::NONE
        }
    }

    fn on_surface(
        &mut self,
        size: Size,
    ) -> Actions {
        if self.surface == Some(size) {
            return Actions::NONE;
        }
        self.surface = Some(size);
        Actions {
            relayout: true,
            rebuild_assets: true,
            redraw: self.visible,
            ..Actions::NONE
        }
    }

    fn on_tick(
        &mut self,
        generation: u32,
    ) -> Actions {
        if self.pending != Some(generation) {
            return Actions::NONE;
        }
        self.pending = None;

        if self.state() != SchedulerState::InteractiveVisible {
            return Actions::NONE;
        }
        Actions {
            redraw: true,
            ..Actions::NONE
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Arm the next phase-locked tick if interactive, otherwise cancel
    /// whatever is pending.
    fn rearm(
        &mut self,
        now_ms: i64,
    ) -> TickCommand {
        if self.state() != SchedulerState::InteractiveVisible {
            return match self.pending.take() {
                Some(_) => TickCommand::Cancel,
                None => TickCommand::Keep,
            };
        }

        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(self.generation);
        let phase = now_ms.rem_euclid(UPDATE_RATE_MS as i64) as u64;
        TickCommand::Arm {
            delay: delay_to_next_update(phase),
            generation: self.generation,
        }
    }

    fn companion_due(
        &mut self,
        now_ms: i64,
    ) -> bool {
        let due = match self.last_companion_request_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= COMPANION_REQUEST_INTERVAL_MS,
        };
        if due {
            self.last_companion_request_ms = Some(now_ms);
        }
        due
    }
}

impl Default for RenderScheduler {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Tests
// =============================================================================
