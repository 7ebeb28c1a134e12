//! Ring watch face simulator for desktop platforms.
//!
//! Runs the face headless against a virtual clock and writes one PNG per
//! scenario step into the output directory (first argument, default
//! `snapshots`). The session log is printed at the end of each run.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod assets;
mod host;
mod timing;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettings, OutputSettingsBuilder, SimulatorDisplay};
use watchface_common::{DataFeeds, DisplayShape, Host, HostEvent, InsetGeometry, WatchFace};

use crate::host::VirtualHost;
use crate::timing::{AMBIENT_RUN, INTERACTIVE_RUN, START_EPOCH_MS, TIME_TICK_PERIOD, UTC_OFFSET_SECS};

/// Round surface size.
const ROUND_SIZE: Size = Size::new(240, 240);

/// Rectangular surface size.
const RECT_SIZE: Size = Size::new(240, 280);

/// Bottom cutout used for the inset snapshot.
const DEMO_INSET: f32 = 24.0;

type Face<'f> = WatchFace<'f, VirtualHost<'f>>;

fn main() {
    let out_dir = env::args().nth(1).map_or_else(|| PathBuf::from("snapshots"), PathBuf::from);
    if let Err(e) = run(&out_dir) {
        eprintln!("simulator failed: {e}");
        std::process::exit(1);
    }
}

fn run(out_dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out_dir)?;
    let settings = OutputSettingsBuilder::new().scale(2).build();

    run_round(out_dir, &settings)?;
    run_rectangular(out_dir, &settings)?;
    Ok(())
}

/// Round face through interactive, muted, ambient and inset states.
fn run_round(
    out_dir: &Path,
    settings: &OutputSettings,
) -> Result<(), Box<dyn Error>> {
    let feeds = DataFeeds::new();
    let mut display = SimulatorDisplay::<Rgb565>::new(ROUND_SIZE);
    let mut face = start_face(&feeds, DisplayShape::Round, ROUND_SIZE, &mut display)?;

    advance(&mut face, &mut display, INTERACTIVE_RUN);
    snapshot(&display, settings, out_dir, "interactive.png")?;

    face.dispatch(HostEvent::InterruptionFilterChanged { muted: true }, &mut display);
    advance(&mut face, &mut display, INTERACTIVE_RUN);
    snapshot(&display, settings, out_dir, "muted.png")?;
    face.dispatch(HostEvent::InterruptionFilterChanged { muted: false }, &mut display);

    face.dispatch(
        HostEvent::PropertiesChanged {
            low_bit_ambient: true,
            burn_in_protection: false,
        },
        &mut display,
    );
    face.dispatch(HostEvent::AmbientModeChanged(true), &mut display);
    advance(&mut face, &mut display, AMBIENT_RUN);
    snapshot(&display, settings, out_dir, "ambient.png")?;

    face.dispatch(HostEvent::AmbientModeChanged(false), &mut display);
    face.dispatch(HostEvent::InsetsChanged(InsetGeometry::new(DEMO_INSET)), &mut display);
    advance(&mut face, &mut display, INTERACTIVE_RUN);
    snapshot(&display, settings, out_dir, "inset.png")?;

    face.host_mut().set_utc_offset(-5 * 3_600);
    face.dispatch(HostEvent::TimeZoneChanged { utc_offset_secs: -5 * 3_600 }, &mut display);
    snapshot(&display, settings, out_dir, "time-zone.png")?;

    print_summary("round", &face);
    face.dispatch(HostEvent::VisibilityChanged(false), &mut display);
    Ok(())
}

/// Rectangular face: octant ring, one snapshot.
fn run_rectangular(
    out_dir: &Path,
    settings: &OutputSettings,
) -> Result<(), Box<dyn Error>> {
    let feeds = DataFeeds::new();
    let mut display = SimulatorDisplay::<Rgb565>::new(RECT_SIZE);
    let mut face = start_face(&feeds, DisplayShape::Rectangular, RECT_SIZE, &mut display)?;

    advance(&mut face, &mut display, INTERACTIVE_RUN);
    snapshot(&display, settings, out_dir, "rectangular.png")?;

    print_summary("rectangular", &face);
    Ok(())
}

/// Create a face, hand it a surface and make it visible.
fn start_face<'f>(
    feeds: &'f DataFeeds,
    shape: DisplayShape,
    size: Size,
    display: &mut SimulatorDisplay<Rgb565>,
) -> Result<Face<'f>, Box<dyn Error>> {
    let mut host = VirtualHost::new(START_EPOCH_MS, UTC_OFFSET_SECS, feeds);
    // Sticky values a real platform would already hold at startup.
    host.request_battery();
    host.request_companion();

    let mut face = WatchFace::new(host, feeds, shape, assets::source_assets()?);
    face.dispatch(HostEvent::SurfaceChanged(size), display);
    face.dispatch(HostEvent::VisibilityChanged(true), display);
    Ok(face)
}

/// Run the virtual clock forward by `span`, delivering every tick and
/// time-tick that falls due on the way.
fn advance(
    face: &mut Face<'_>,
    display: &mut SimulatorDisplay<Rgb565>,
    span: Duration,
) {
    let period_ms = TIME_TICK_PERIOD.as_millis() as i64;
    let start = face.host().now_ms();
    let until = start + span.as_millis() as i64;
    let mut next_minute = (start / period_ms + 1) * period_ms;

    loop {
        let tick = face.host().pending_tick().filter(|&(deadline, _)| deadline <= until);
        let minute_due = next_minute <= until;

        match tick {
            Some((deadline, generation)) if !minute_due || deadline < next_minute => {
                face.host_mut().set_now(deadline);
                face.dispatch(HostEvent::TickFired { generation }, display);
            }
            _ if minute_due => {
                face.host_mut().set_now(next_minute);
                face.dispatch(HostEvent::TimeTick, display);
                next_minute += period_ms;
            }
            _ => break,
        }
    }
    face.host_mut().set_now(until);
}

fn snapshot(
    display: &SimulatorDisplay<Rgb565>,
    settings: &OutputSettings,
    out_dir: &Path,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    let path = out_dir.join(name);
    display.to_rgb_output_image(settings).save_png(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn print_summary(
    label: &str,
    face: &Face<'_>,
) {
    let host = face.host();
    println!(
        "[{label}] {} frames drawn, {} failed, {} ticks armed, {} cancels, time zone subscribed: {}",
        face.frames_drawn(),
        face.frames_failed(),
        host.schedules(),
        host.cancels(),
        host.is_subscribed(),
    );
    for entry in face.log().iter() {
        println!("  {entry}");
    }
}
