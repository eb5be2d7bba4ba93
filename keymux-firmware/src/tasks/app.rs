//! Demo applications
//!
//! Both read from [`KEY_EVENTS`] and write to the display buffers only.
//! Which one runs is chosen by `[app] mode` in `keymux.toml`.

use core::fmt::Write;
use core::write;

use defmt::*;
use embassy_time::Timer;
use heapless::String;

use keymux_core::display::led::{self, LED_DIGITS};
use keymux_core::display::oled::{self, OLED_COLS};
use keymux_core::keypad::{format_value, read_float, Direction, EntryError};

use crate::channels::{KEY_EVENTS, LED_BUFFER, OLED_BUFFER, OLED_DIRTY};

/// How long a result stays up before the next prompt
const RESULT_HOLD_SECS: u64 = 2;

fn show_line(line: usize, text: &str) {
    oled::set_line(&OLED_BUFFER, line, text).ok();
    OLED_DIRTY.signal(());
}

/// Scroll every pressed key onto the LED array and describe the last event
/// on the second OLED line
#[embassy_executor::task]
pub async fn show_keys_task(keymap: &'static str) {
    info!("Show-keys task started");

    loop {
        let event = KEY_EVENTS.wait_for_event().await;
        let symbol = event.key.symbol_in(keymap);
        debug!("Key {} {} (#{})", event.key, event.direction, event.sequence);

        if event.direction == Direction::Pressed {
            led::scroll_in(&LED_BUFFER, symbol);
        }

        let mut text: String<OLED_COLS> = String::new();
        let verb = match event.direction {
            Direction::Pressed => "pressed",
            Direction::Released => "released",
        };
        write!(text, "Key {} {}", symbol, verb).ok();
        show_line(1, &text);
    }
}

/// Prompt for a number, echo it while it is typed, then show the result
#[embassy_executor::task]
pub async fn float_entry_task(keymap: &'static str) {
    info!("Float entry task started");

    loop {
        show_line(0, "Enter a number:");
        show_line(1, "");
        led::print(&LED_BUFFER, "");

        let result = read_float(&KEY_EVENTS, keymap, |text| {
            show_line(1, text);
            // Rightmost digits when the entry is wider than the array
            let tail = &text[text.len().saturating_sub(LED_DIGITS)..];
            led::print(&LED_BUFFER, tail);
        })
        .await;

        match result {
            Ok(value) => {
                info!("Entered {}", value);
                match format_value::<OLED_COLS>(value) {
                    Some(text) => {
                        show_line(0, "You entered");
                        show_line(1, &text);
                    }
                    None => {
                        warn!("Entered value too wide for the display");
                        show_line(0, "Entered value");
                        show_line(1, "Too wide to show");
                    }
                }
            }
            Err(e) => {
                warn!("Entry rejected: {}", e);
                show_line(0, "Not a number");
                show_line(1, entry_error_text(e));
            }
        }

        Timer::after_secs(RESULT_HOLD_SECS).await;
    }
}

fn entry_error_text(error: EntryError) -> &'static str {
    match error {
        EntryError::Empty => "(nothing typed)",
        EntryError::MisplacedSign => "Sign not first",
        EntryError::DuplicatePoint => "Two points",
        EntryError::TooLong => "Too many digits",
        EntryError::Invalid => "Bad format",
        EntryError::Cancelled => "Cancelled",
    }
}
