//! Keypad scan task
//!
//! One column per tick: sample the rows against the driven column, debounce,
//! push any events, then drive the next column so it has a full tick to
//! settle before it is sampled.

use defmt::*;
use embassy_stm32::gpio::{Input, OutputOpenDrain};
use embassy_time::{Duration, Ticker};

use keymux_core::keypad::KeypadScanner;
use keymux_drivers::matrix::PinMatrix;

use crate::channels::KEY_EVENTS;

/// Scanner over the board's GPIO keypad
pub type Keypad = KeypadScanner<PinMatrix<OutputOpenDrain<'static>, Input<'static>>>;

#[embassy_executor::task]
pub async fn scan_task(mut scanner: Keypad, scan_rate_hz: u32) {
    info!(
        "Scan task started: {} Hz, depth {}",
        scan_rate_hz,
        scanner.debouncer().depth()
    );

    let mut ticker = Ticker::every(Duration::from_hz(scan_rate_hz as u64));
    let mut faults: u32 = 0;
    let mut dropped = 0;

    loop {
        ticker.next().await;

        match scanner.tick(&KEY_EVENTS) {
            Ok(0) => {}
            Ok(events) => trace!("{} key event(s) on tick {}", events, scanner.ticks()),
            Err(e) => {
                faults = faults.wrapping_add(1);
                // Log the 1st, 2nd, 4th, 8th... fault only
                if faults.is_power_of_two() {
                    warn!("Scan fault {} (total {})", e, faults);
                }
            }
        }

        let now_dropped = KEY_EVENTS.dropped();
        if now_dropped != dropped {
            warn!("Event queue full, {} event(s) dropped", now_dropped - dropped);
            dropped = now_dropped;
        }
    }
}
