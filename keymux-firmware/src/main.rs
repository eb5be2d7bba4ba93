//! keymux - Keypad and Display Refresh Firmware
//!
//! Scans a 4×4 matrix keypad from a timer-driven interrupt executor,
//! debounces it into a queue of key events, and keeps two serial displays
//! refreshed from memory buffers that the application edits at will.
//!
//! Pin map (STM32F091RC):
//!
//! | Function          | Pins                 |
//! |-------------------|----------------------|
//! | Keypad columns    | PC4-PC7 (open drain) |
//! | Keypad rows       | PC0-PC3              |
//! | LED array (SPI2)  | PB12 NSS, PB13 SCK, PB15 MOSI |
//! | OLED (SPI1)       | PA15 NSS, PA5 SCK, PA7 MOSI   |

#![no_std]
#![no_main]

mod channels;
mod config;
mod tasks;

use cortex_m_rt::entry;
use defmt::*;
use defmt::panic;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::gpio::{Input, Level, Output, OutputOpenDrain, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use keymux_core::config::{LedTransfer, OledTransfer, RowPolarity};
use keymux_core::display::{led, oled, SoftwareReplay};
use keymux_core::keypad::{Debouncer, KeypadScanner};
use keymux_core::traits::CircularTransfer;
use keymux_drivers::display::BitBangWriter;
use keymux_drivers::matrix::PinMatrix;
use keymux_hal_stm32f0::{
    spi, CircularDma, DmaChannel, DmaPacer, FrameConfig, RawSpiWriter, SpiPort,
};

use crate::channels::{LED_BUFFER, OLED_BUFFER};
use crate::config::AppMode;

/// Timer kernel clock with the reset clock tree (8 MHz HSI)
const TIMER_CLOCK_HZ: u32 = 8_000_000;

/// LED words per second on the timer-paced DMA path
const LED_PACE_HZ: u32 = 1000;

/// High-priority executor for the scan task, run from the TIM7 vector
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

/// Thread-mode executor for displays and the application
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn TIM7() {
    EXECUTOR_HIGH.on_interrupt()
}

#[entry]
fn main() -> ! {
    info!("keymux firmware starting...");

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let keypad = config::keypad();
    let display = config::DISPLAY;
    info!(
        "Keypad: {} Hz, depth {}, {} ({} us to register a press)",
        keypad.scan_rate_hz,
        keypad.debounce_depth,
        keypad.polarity,
        keypad.debounce_time_us()
    );

    // Banners go in before any transfer starts reading the buffers
    led::print(&LED_BUFFER, display.led_banner);
    for (line, text) in display.oled_banner.iter().enumerate() {
        oled::set_line(&OLED_BUFFER, line, text).ok();
    }

    // Keypad: released columns idle at the inactive level
    let (idle, row_pull) = match keypad.polarity {
        RowPolarity::ActiveLow => (Level::High, Pull::Up),
        RowPolarity::ActiveHigh => (Level::Low, Pull::Down),
    };
    let columns = [
        OutputOpenDrain::new(p.PC4, idle, Speed::Low),
        OutputOpenDrain::new(p.PC5, idle, Speed::Low),
        OutputOpenDrain::new(p.PC6, idle, Speed::Low),
        OutputOpenDrain::new(p.PC7, idle, Speed::Low),
    ];
    let rows = [
        Input::new(p.PC0, row_pull),
        Input::new(p.PC1, row_pull),
        Input::new(p.PC2, row_pull),
        Input::new(p.PC3, row_pull),
    ];
    let matrix = PinMatrix::new(columns, rows, keypad.polarity);
    let scanner = match KeypadScanner::new(matrix, Debouncer::new(keypad.debounce_depth)) {
        Ok(scanner) => scanner,
        Err(e) => panic!("Keypad init failed: {}", e),
    };

    // OLED on SPI1
    let mut oled_direct = None;
    match display.oled {
        OledTransfer::Off => info!("OLED disabled"),
        OledTransfer::Direct => {
            spi::init_master(SpiPort::Spi1, FrameConfig::OLED.without_dma());
            let mut writer = RawSpiWriter::new(SpiPort::Spi1);
            init_oled(&mut writer);
            oled_direct = Some(writer);
        }
        OledTransfer::Dma => {
            spi::init_master(SpiPort::Spi1, FrameConfig::OLED);
            init_oled(&mut RawSpiWriter::new(SpiPort::Spi1));
            let mut dma = CircularDma::new(DmaChannel::SPI1_TX, SpiPort::Spi1.data_register());
            match dma.arm(&OLED_BUFFER) {
                Ok(()) => info!("OLED refresh running (DMA)"),
                Err(e) => error!("OLED DMA not started: {}", e),
            }
        }
    }

    // LED array on PB12/PB13/PB15
    let mut led_replay = None;
    match display.led {
        LedTransfer::BitBang => {
            let cs = Output::new(p.PB12, Level::High, Speed::Low);
            let sck = Output::new(p.PB13, Level::Low, Speed::Low);
            let sdi = Output::new(p.PB15, Level::Low, Speed::Low);
            match BitBangWriter::new(cs, sck, sdi, Delay) {
                Ok(writer) => {
                    let mut replay: tasks::LedReplay = SoftwareReplay::new(writer);
                    match replay.arm(&LED_BUFFER) {
                        Ok(()) => led_replay = Some(replay),
                        Err(e) => error!("LED replay not started: {}", e),
                    }
                }
                Err(e) => error!("LED pins unavailable: {}", e),
            }
        }
        LedTransfer::Dma => {
            spi::init_master(SpiPort::Spi2, FrameConfig::LED);
            let mut dma = CircularDma::new(DmaChannel::SPI2_TX, SpiPort::Spi2.data_register());
            match dma.arm(&LED_BUFFER) {
                Ok(()) => info!("LED refresh running (DMA)"),
                Err(e) => error!("LED DMA not started: {}", e),
            }
        }
        LedTransfer::TimedDma => {
            spi::init_master(SpiPort::Spi2, FrameConfig::LED.without_dma());
            let mut dma = CircularDma::new(DmaChannel::TIM15_UP, SpiPort::Spi2.data_register());
            match dma.arm(&LED_BUFFER) {
                Ok(()) => match DmaPacer::new(TIMER_CLOCK_HZ, LED_PACE_HZ) {
                    Ok(pacer) => {
                        pacer.start();
                        info!("LED refresh running (DMA paced at {} Hz)", LED_PACE_HZ);
                    }
                    Err(e) => error!("LED pacer not started: {}", e),
                },
                Err(e) => error!("LED DMA not started: {}", e),
            }
        }
    }

    // Scan task on the interrupt executor so it preempts everything else
    interrupt::TIM7.set_priority(Priority::P1);
    let spawner = EXECUTOR_HIGH.start(interrupt::TIM7);
    spawner
        .spawn(tasks::scan_task(scanner, keypad.scan_rate_hz))
        .unwrap();

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(move |spawner| {
        if let Some(replay) = led_replay {
            spawner.spawn(tasks::led_bitbang_task(replay)).unwrap();
        }
        if let Some(writer) = oled_direct {
            spawner.spawn(tasks::oled_direct_task(writer)).unwrap();
        }

        info!("Application: {}", config::APP_MODE);
        match config::APP_MODE {
            AppMode::ShowKeys => spawner.spawn(tasks::show_keys_task(keypad.keymap)).unwrap(),
            AppMode::FloatEntry => spawner.spawn(tasks::float_entry_task(keypad.keymap)).unwrap(),
        }
    })
}

fn init_oled(writer: &mut RawSpiWriter) {
    // The polled writer cannot fail
    if let Err(e) = tasks::init_oled(writer) {
        match e {}
    }
}
