//! Ring watch face firmware for Raspberry Pi Pico 2 (RP2350).
//!
//! Drives a 240x240 ST7789 panel. The face runs in the render loop in
//! [`board`]; embassy tasks feed it host events:
//!
//! - tick timer: fires the redraw the face armed
//! - heartbeat: minute time-tick
//! - feeds: battery, steps and companion data with a bounded wait
//! - buttons: ambient / mute / visibility / low-bit toggles
//!
//! Build with `cargo build -p watchface-pico2 --release --target thumbv8m.main-none-eabihf`.
//! On the host this compiles to a stub so `cargo build --workspace` works.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[cfg(target_arch = "arm")]
extern crate alloc;

#[cfg(target_arch = "arm")]
mod artwork;
#[cfg(target_arch = "arm")]
mod board;
#[cfg(target_arch = "arm")]
mod config;
#[cfg(target_arch = "arm")]
mod display;
#[cfg(target_arch = "arm")]
mod host;
#[cfg(target_arch = "arm")]
mod st7789;
#[cfg(target_arch = "arm")]
mod tasks;

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("watchface-pico2 is firmware; build it with --target thumbv8m.main-none-eabihf");
}
