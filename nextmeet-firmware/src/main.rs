//! NextMeet - Meeting Countdown Clock Firmware
//!
//! Firmware for a Raspberry Pi Pico W driving a 64x32 HUB75 matrix. Shows
//! the time, the date, a countdown to the next calendar event and the
//! event title, synchronised from two LAN endpoints.
//!
//! Board wiring:
//! - HUB75: R1 G1 B1 R2 G2 B2 on GPIO 0-5, A B C D on GPIO 6-9,
//!   CLK 11, LAT 12, OE 13
//! - LIS3DH on I2C0: SDA GPIO 16, SCL GPIO 17
//! - Buttons: up GPIO 20, down GPIO 21 (to ground)
//! - CYW43: GPIO 23, 24, 25, 29

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio;
use embassy_time::{Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use nextmeet_core::compositor::{Layers, Rotation};
use nextmeet_core::config::{parse_settings, Settings};
use nextmeet_core::traits::FrameSink;
use nextmeet_core::{App, Tick};
use nextmeet_display::{FrameBuffer, FONTS};
use nextmeet_drivers::{Hub75, Hub75Pins, Lis3dh};

use crate::buttons::PanelButtons;
use crate::clock::EmbassyClock;
use crate::display::MatrixSink;
use crate::net::HttpFetcher;
use crate::wifi::WifiResources;

/// Embedded settings (compiled into firmware)
/// Edit settings.toml and rebuild to customize
const EMBEDDED_SETTINGS: &str = include_str!("../settings.toml");

mod buttons;
mod channels;
mod clock;
mod display;
mod net;
mod tasks;
mod wifi;

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// Must live forever: the fetcher keeps the network settings for rejoins
static SETTINGS: StaticCell<Settings> = StaticCell::new();
static FRAME_BUFFER: StaticCell<FrameBuffer> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("NextMeet firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let settings: &'static Settings = SETTINGS.init(load_settings());

    // Orientation is read once; the layout never changes afterwards
    let i2c = I2c::new_async(p.I2C0, p.PIN_17, p.PIN_16, Irqs, i2c::Config::default());
    let rotation = read_rotation(Lis3dh::new(i2c)).await;
    info!("Panel rotation: {} degrees", rotation.degrees());

    let hub75 = unwrap!(Hub75::new(Hub75Pins {
        r1: Output::new(p.PIN_0, Level::Low),
        g1: Output::new(p.PIN_1, Level::Low),
        b1: Output::new(p.PIN_2, Level::Low),
        r2: Output::new(p.PIN_3, Level::Low),
        g2: Output::new(p.PIN_4, Level::Low),
        b2: Output::new(p.PIN_5, Level::Low),
        a: Output::new(p.PIN_6, Level::Low),
        b: Output::new(p.PIN_7, Level::Low),
        c: Output::new(p.PIN_8, Level::Low),
        d: Output::new(p.PIN_9, Level::Low),
        clk: Output::new(p.PIN_11, Level::Low),
        lat: Output::new(p.PIN_12, Level::Low),
        oe: Output::new(p.PIN_13, Level::High),
    }));
    spawner.spawn(unwrap!(tasks::matrix_task(hub75)));

    // Splash while the radio comes up
    let mut sink = MatrixSink::new(FRAME_BUFFER.init(FrameBuffer::new(rotation)));
    if let Err(e) = sink.draw(&Layers::splash(rotation)) {
        warn!("Splash draw failed: {}", e);
    }

    let (stack, control) = wifi::start(
        spawner,
        WifiResources {
            pwr: p.PIN_23,
            cs: p.PIN_25,
            dio: p.PIN_24,
            clk: p.PIN_29,
            pio: p.PIO0,
            dma: p.DMA_CH0,
        },
        &settings.network,
    )
    .await;

    let buttons = PanelButtons::new(Input::new(p.PIN_20, Pull::Up), Input::new(p.PIN_21, Pull::Up));
    let fetcher = HttpFetcher::new(stack, control, &settings.network);

    let mut app = match App::new(
        settings,
        rotation,
        FONTS,
        fetcher,
        EmbassyClock::new(),
        sink,
        buttons,
    ) {
        Ok(app) => app,
        Err(e) => defmt::panic!("Time URL does not fit: {}", e),
    };

    app.start().await;
    info!("Started, next event: {}", app.event().title.as_str());

    let mut ticker = Ticker::every(Duration::from_millis(settings.display.frame_period_ms as u64));
    loop {
        match app.tick().await {
            Tick::Rendered => ticker.next().await,
            Tick::Restarted => debug!("Clock resynced, restarting frame"),
        }
    }
}

/// Parse the embedded settings
///
/// build.rs has already validated the file, so a failure here means the
/// validator and the parser disagree.
fn load_settings() -> Settings {
    match parse_settings(EMBEDDED_SETTINGS) {
        Ok(settings) => {
            info!(
                "Settings: ssid {}, timezone {}, frame {} ms",
                settings.network.ssid.as_str(),
                settings.location.timezone.as_str(),
                settings.display.frame_period_ms
            );
            info!("Time endpoint: {}", settings.endpoints.time_url.as_str());
            info!("Event endpoint: {}", settings.endpoints.event_url.as_str());
            settings
        }
        Err(e) => defmt::panic!("Failed to parse embedded settings: {}", e),
    }
}

/// Read the panel orientation, falling back to landscape
async fn read_rotation<I: embedded_hal_async::i2c::I2c>(mut accel: Lis3dh<I>) -> Rotation
where
    I::Error: Format,
{
    if let Err(e) = accel.init().await {
        warn!("Accelerometer init failed: {}", e);
        return Rotation::Deg0;
    }

    // First sample is ready after one 100 Hz period
    Timer::after_millis(20).await;

    match accel.rotation().await {
        Ok(rotation) => rotation,
        Err(e) => {
            warn!("Accelerometer read failed: {}", e);
            Rotation::Deg0
        }
    }
}
