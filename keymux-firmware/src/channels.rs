//! Shared state between the scan task, the display tasks and the
//! application
//!
//! The two display buffers are read continuously by DMA (or by the
//! software replay) and edited by the application at any time.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use keymux_core::config::EVENT_QUEUE_CAPACITY;
use keymux_core::display::led::{self, LedBuffer};
use keymux_core::display::oled::{self, OledBuffer};
use keymux_core::keypad::EventQueue;

/// Debounced key events, pushed by the scan task
pub static KEY_EVENTS: EventQueue<CriticalSectionRawMutex, EVENT_QUEUE_CAPACITY> =
    EventQueue::new();

/// Refresh buffer for the 8-digit LED array
pub static LED_BUFFER: LedBuffer = led::led_buffer();

/// Refresh buffer for the 2×16 character OLED
pub static OLED_BUFFER: OledBuffer = oled::oled_buffer();

/// OLED buffer was edited (only waited on when the OLED is driven directly)
pub static OLED_DIRTY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
