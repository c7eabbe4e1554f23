//! Pageflip demo firmware
//!
//! Drives an SH1106 OLED from an RP2040. A render task draws frames into the
//! slot pool while a transfer task drains them to the panel one page per
//! tick; both share the display behind a mutex.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Blocking, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pageflip_core::Display;
use pageflip_drivers::Sh1106Sink;

use crate::config::{parse_config, FirmwareConfig};

mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit display.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../display.toml");

/// Frame slots
const SLOTS: usize = 2;

/// Bytes per 128x64 frame
const FRAME_SIZE: usize = 1024;

/// SPI clock for the panel
const SPI_FREQUENCY_HZ: u32 = 8_000_000;

pub type PanelSink = Sh1106Sink<Spi<'static, SPI0, Blocking>, Output<'static>, Output<'static>>;
pub type PanelDisplay = Display<PanelSink, SLOTS, FRAME_SIZE>;
pub type SharedDisplay = Mutex<CriticalSectionRawMutex, PanelDisplay>;

static DISPLAY: StaticCell<SharedDisplay> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pageflip firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Panel '{}': {}x{}, {} pages per frame",
        config.display.label.as_str(),
        config.display.geometry.width,
        config.display.geometry.height,
        config.display.num_pages
    );

    // SPI0: SCK=GPIO18, MOSI=GPIO19; CS=GPIO17, DC=GPIO20
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY_HZ;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_20, Level::Low);
    let sink = Sh1106Sink::new(spi, dc, cs, config.display.geometry);

    let mut display = match PanelDisplay::new(sink, &config.display) {
        Ok(display) => display,
        Err(e) => {
            error!("Display configuration rejected: {:?}", e);
            return;
        }
    };

    if let Err(e) = display.init() {
        error!("Panel init failed: {:?}", e);
        return;
    }
    info!("Panel initialized");

    let display: &'static SharedDisplay = DISPLAY.init(Mutex::new(display));

    unwrap!(spawner.spawn(tasks::transfer_task(display)));
    unwrap!(spawner.spawn(tasks::render_task(display, config.frame_interval_ms)));

    info!("All tasks spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> FirmwareConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse display.toml: {:?}, using defaults", e);
            FirmwareConfig::default()
        }
    }
}
