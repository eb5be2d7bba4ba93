//! Embassy async tasks
//!
//! The scan task runs on the interrupt executor; everything else runs on
//! the thread executor and talks to it through [`crate::channels`].

pub mod app;
pub mod display;
pub mod scan;

pub use app::{float_entry_task, show_keys_task};
pub use display::{init_oled, led_bitbang_task, oled_direct_task, LedReplay};
pub use scan::{scan_task, Keypad};
