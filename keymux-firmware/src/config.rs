//! Board configuration
//!
//! The constants below are generated by build.rs from `keymux.toml`, which
//! it has already validated. [`keypad`] re-checks the keypad values against
//! the core's own limits before the scanner is built.

use defmt::*;
use keymux_core::config::{
    DisplayConfig, KeypadConfig, LedTransfer, OledTransfer, RowPolarity,
};

/// Application running on the thread executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum AppMode {
    /// Echo every key on the LED array and the OLED
    ShowKeys,
    /// Read numbers terminated by `#`
    FloatEntry,
}

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Keypad configuration, or the defaults if the generated one is rejected
pub fn keypad() -> KeypadConfig {
    match KEYPAD.validate() {
        Ok(()) => KEYPAD,
        Err(e) => {
            warn!("Keypad config rejected ({}), using defaults", e);
            KeypadConfig::default()
        }
    }
}
