//! Ring watch face core.
//!
//! Platform-agnostic code shared between the desktop simulator and the
//! Pico 2 firmware:
//!
//! - [`scheduler`]: render scheduler state machine (visibility, ambient, ticks)
//! - [`geometry`]: progress ring paths for round, inset and rectangular screens
//! - [`style`]: per-element paints derived from the display mode
//! - [`assets`]: bitmap scaling and ambient desaturation
//! - [`clock`]: local time, progress fraction and tick phase
//! - [`render`]: draws one frame onto any `DrawTarget`
//! - [`face`]: the session that ties everything together behind [`face::Host`]
//! - [`feeds`]: lock-free cache for battery, steps and companion data
//! - [`profiling`]: session log ring
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` + `alloc` outside of tests. Tests run on the host
//! with the standard harness.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod assets;
pub mod clock;
pub mod colors;
pub mod config;
pub mod face;
pub mod feeds;
pub mod geometry;
pub mod profiling;
pub mod render;
pub mod scheduler;
pub mod style;

// Re-export commonly used items
pub use face::{Host, WatchFace};
pub use feeds::DataFeeds;
pub use geometry::{DisplayShape, InsetGeometry};
pub use scheduler::HostEvent;
