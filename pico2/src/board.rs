//! Board bring-up and the render loop.

use core::mem::MaybeUninit;

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::Spi;
use embedded_alloc::LlffHeap as Heap;
use embedded_graphics::prelude::*;
use static_cell::ConstStaticCell;
use watchface_common::{DataFeeds, HostEvent, WatchFace};
use {defmt_rtt as _, panic_probe as _};

use crate::config::{BOOT_EPOCH_MS, HEAP_SIZE, SHAPE};
use crate::display::display_spi_config;
use crate::host::{BoardHost, EVENTS, FEED_REQUESTS, FeedRequest};
use crate::st7789::{BUFFER_SIZE, HEIGHT, St7789Flusher, St7789Renderer, WIDTH};
use crate::tasks::{BatterySense, Buttons, buttons_task, feeds_task, heartbeat_task, tick_timer_task};

#[global_allocator]
static HEAP: Heap = Heap::empty();

/// Latest battery, steps and companion values, written by the feed task.
static FEEDS: DataFeeds = DataFeeds::new();

/// Single RGB565 framebuffer, handed out once.
static FRAMEBUFFER: ConstStaticCell<[u8; BUFFER_SIZE]> = ConstStaticCell::new([0u8; BUFFER_SIZE]);

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-watchface"),
    embassy_rp::binary_info::rp_program_description!(c"Ring watch face on a 240x240 ST7789"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    {
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        // SAFETY: called once, before the first allocation
        unsafe { HEAP.init(core::ptr::addr_of_mut!(HEAP_MEM) as usize, HEAP_SIZE) }
    }

    let p = embassy_rp::init(Default::default());
    info!("Watch face starting");

    // Display: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let _backlight = Output::new(p.PIN_20, Level::High);
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, display_spi_config());

    let mut flusher = St7789Flusher::new(spi, dc, cs);
    flusher.init().await;
    let mut renderer = St7789Renderer::new(FRAMEBUFFER.take());
    info!("Display initialized");

    // Tasks
    let buttons = Buttons {
        a: Input::new(p.PIN_12, Pull::Up),
        b: Input::new(p.PIN_13, Pull::Up),
        x: Input::new(p.PIN_14, Pull::Up),
        y: Input::new(p.PIN_15, Pull::Up),
    };
    let battery = BatterySense {
        adc: Adc::new(p.ADC, Irqs, adc::Config::default()),
        vsys: adc::Channel::new_pin(p.PIN_29, Pull::None),
    };
    spawner.spawn(tick_timer_task()).unwrap();
    spawner.spawn(heartbeat_task(BoardHost::new(BOOT_EPOCH_MS))).unwrap();
    spawner.spawn(feeds_task(battery, &FEEDS)).unwrap();
    spawner.spawn(buttons_task(buttons)).unwrap();
    info!("Tasks spawned");

    // Values a phone platform would already hold at startup
    FEED_REQUESTS.send(FeedRequest::Battery).await;
    FEED_REQUESTS.send(FeedRequest::Companion).await;

    let source = match crate::artwork::source_assets() {
        Ok(source) => source,
        Err(e) => {
            error!("artwork: {}", e);
            Default::default()
        }
    };

    let mut face = WatchFace::new(BoardHost::new(BOOT_EPOCH_MS), &FEEDS, SHAPE, source);
    let surface = Size::new(WIDTH as u32, HEIGHT as u32);
    face.dispatch(HostEvent::SurfaceChanged(surface), &mut renderer);
    face.dispatch(HostEvent::VisibilityChanged(true), &mut renderer);

    let mut flushed = 0;
    loop {
        if face.frames_drawn() != flushed {
            flushed = face.frames_drawn();
            flusher.flush_buffer(renderer.buffer()).await;
        }
        let event = EVENTS.receive().await;
        face.dispatch(event, &mut renderer);
    }
}
