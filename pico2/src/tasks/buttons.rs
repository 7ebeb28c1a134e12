//! Demo controls.
//!
//! The board has no platform sending lifecycle notifications, so the four
//! buttons stand in for them:
//! - **A**: toggle ambient mode
//! - **B**: toggle do-not-disturb (muted)
//! - **X**: toggle visibility (screen off / on)
//! - **Y**: toggle low-bit ambient (forces grayscale ambient assets)

use defmt::info;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};
use watchface_common::HostEvent;

use crate::config::BUTTON_POLL;
use crate::host::EVENTS;

/// Debounce duration in milliseconds.
const DEBOUNCE_MS: u64 = 50;

pub struct Buttons {
    pub a: Input<'static>,
    pub b: Input<'static>,
    pub x: Input<'static>,
    pub y: Input<'static>,
}

/// Button debounce state with time-based edge detection.
struct ButtonState {
    was_pressed: bool,
    last_change: Option<Instant>,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change: None,
        }
    }

    /// True only on the press edge. Buttons are active-low.
    fn just_pressed(
        &mut self,
        is_low: bool,
    ) -> bool {
        if is_low == self.was_pressed {
            return false;
        }
        if let Some(last) = self.last_change
            && last.elapsed() < Duration::from_millis(DEBOUNCE_MS)
        {
            return false;
        }
        self.was_pressed = is_low;
        self.last_change = Some(Instant::now());
        is_low
    }
}

#[embassy_executor::task]
pub async fn buttons_task(buttons: Buttons) {
    let mut a = ButtonState::new();
    let mut b = ButtonState::new();
    let mut x = ButtonState::new();
    let mut y = ButtonState::new();

    let mut ambient = false;
    let mut muted = false;
    let mut visible = true;
    let mut low_bit = false;

    let mut ticker = Ticker::every(BUTTON_POLL);
    loop {
        ticker.next().await;

        if a.just_pressed(buttons.a.is_low()) {
            ambient = !ambient;
            info!("ambient: {}", ambient);
            EVENTS.send(HostEvent::AmbientModeChanged(ambient)).await;
        }
        if b.just_pressed(buttons.b.is_low()) {
            muted = !muted;
            info!("muted: {}", muted);
            EVENTS.send(HostEvent::InterruptionFilterChanged { muted }).await;
        }
        if x.just_pressed(buttons.x.is_low()) {
            visible = !visible;
            info!("visible: {}", visible);
            EVENTS.send(HostEvent::VisibilityChanged(visible)).await;
        }
        if y.just_pressed(buttons.y.is_low()) {
            low_bit = !low_bit;
            info!("low-bit ambient: {}", low_bit);
            EVENTS
                .send(HostEvent::PropertiesChanged {
                    low_bit_ambient: low_bit,
                    burn_in_protection: false,
                })
                .await;
        }
    }
}
