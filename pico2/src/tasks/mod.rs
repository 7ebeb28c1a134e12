//! Async tasks for the watch face firmware.
//!
//! Every task talks to the render loop through the statics in
//! [`crate::host`]:
//! - `tick`: one-shot redraw timer, re-armed by the face
//! - `heartbeat`: minute time-tick, also drives ambient redraws
//! - `feeds`: battery, steps and companion reads with a bounded wait
//! - `buttons`: demo controls standing in for platform notifications

pub mod buttons;
pub mod feeds;
pub mod heartbeat;
pub mod tick;

pub use buttons::{Buttons, buttons_task};
pub use feeds::{BatterySense, feeds_task};
pub use heartbeat::heartbeat_task;
pub use tick::tick_timer_task;
