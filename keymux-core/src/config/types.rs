//! Configuration type definitions
//!
//! These types describe one board: how the keypad is scanned and which
//! transfer strategy feeds each display. The firmware fills them from
//! `keymux.toml` at build time.

/// Default scan tick rate (one column per tick)
pub const DEFAULT_SCAN_RATE_HZ: u32 = 1000;

/// Highest scan rate accepted by [`KeypadConfig::validate`]
pub const MAX_SCAN_RATE_HZ: u32 = 10_000;

/// Default number of consistent samples before a key changes state
pub const DEFAULT_DEBOUNCE_DEPTH: u8 = 3;

/// Event queue capacity
pub const EVENT_QUEUE_CAPACITY: usize = 16;

/// Keycap symbols indexed by `column * 4 + row`
pub const DEFAULT_KEYMAP: &str = "DCBA#9630852*741";

/// Electrical level of a row input that is in contact with the driven column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RowPolarity {
    /// Rows are pulled up and the driven column sinks them
    #[default]
    ActiveLow,
    /// Rows are pulled down and the driven column sources them
    ActiveHigh,
}

impl RowPolarity {
    /// Convert a raw pin level into "in contact"
    pub fn is_contact(self, pin_high: bool) -> bool {
        match self {
            RowPolarity::ActiveLow => !pin_high,
            RowPolarity::ActiveHigh => pin_high,
        }
    }
}

/// Keypad scanning configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadConfig {
    /// Scan tick rate in Hz
    pub scan_rate_hz: u32,
    /// Consecutive samples required for a state change (1-8)
    pub debounce_depth: u8,
    /// 16 keycap symbols indexed by `column * 4 + row`
    pub keymap: &'static str,
    /// Row input polarity
    pub polarity: RowPolarity,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            scan_rate_hz: DEFAULT_SCAN_RATE_HZ,
            debounce_depth: DEFAULT_DEBOUNCE_DEPTH,
            keymap: DEFAULT_KEYMAP,
            polarity: RowPolarity::ActiveLow,
        }
    }
}

impl KeypadConfig {
    /// Check the configuration for values the scanner can't honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_rate_hz == 0 || self.scan_rate_hz > MAX_SCAN_RATE_HZ {
            return Err(ConfigError::ScanRate);
        }
        if !(1..=crate::keypad::debounce::MAX_DEBOUNCE_DEPTH).contains(&self.debounce_depth) {
            return Err(ConfigError::DebounceDepth);
        }
        if self.keymap.len() != crate::keypad::NUM_KEYS || !self.keymap.is_ascii() {
            return Err(ConfigError::Keymap);
        }
        Ok(())
    }

    /// Time for one key's history to advance by one sample, in microseconds
    pub fn cycle_period_us(&self) -> u32 {
        1_000_000 / self.scan_rate_hz.max(1) * crate::keypad::NUM_COLS as u32
    }

    /// Minimum time a key must be held to be reported, in microseconds
    pub fn debounce_time_us(&self) -> u32 {
        self.cycle_period_us() * self.debounce_depth as u32
    }
}

/// How the LED array buffer reaches the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedTransfer {
    /// Software replay through bit-banged GPIO
    #[default]
    BitBang,
    /// Circular DMA to SPI, paced by the transmitter-empty request
    Dma,
    /// Circular DMA to SPI, paced by a timer update
    TimedDma,
}

/// How the OLED buffer reaches the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OledTransfer {
    /// OLED not fitted
    Off,
    /// Lines written word by word when they change
    Direct,
    /// Circular DMA to SPI
    #[default]
    Dma,
}

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// LED array transfer strategy
    pub led: LedTransfer,
    /// OLED transfer strategy
    pub oled: OledTransfer,
    /// Text shown on the LED array at boot (up to 8 characters)
    pub led_banner: &'static str,
    /// Text shown on the two OLED lines at boot
    pub oled_banner: [&'static str; 2],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            led: LedTransfer::BitBang,
            oled: OledTransfer::Dma,
            led_banner: "",
            oled_banner: ["", ""],
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Scan rate is zero or above [`MAX_SCAN_RATE_HZ`]
    ScanRate,
    /// Debounce depth outside 1-8
    DebounceDepth,
    /// Keymap is not 16 ASCII characters
    Keymap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(KeypadConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_values() {
        let base = KeypadConfig::default();

        let config = KeypadConfig { scan_rate_hz: 0, ..base };
        assert_eq!(config.validate(), Err(ConfigError::ScanRate));

        let config = KeypadConfig { debounce_depth: 9, ..base };
        assert_eq!(config.validate(), Err(ConfigError::DebounceDepth));

        let config = KeypadConfig { keymap: "123", ..base };
        assert_eq!(config.validate(), Err(ConfigError::Keymap));
    }

    #[test]
    fn test_debounce_timing() {
        // 1 kHz, 4 columns: each key sampled every 4 ms, 3 samples = 12 ms
        let config = KeypadConfig::default();
        assert_eq!(config.cycle_period_us(), 4000);
        assert_eq!(config.debounce_time_us(), 12_000);
    }

    #[test]
    fn test_polarity() {
        assert!(RowPolarity::ActiveLow.is_contact(false));
        assert!(!RowPolarity::ActiveLow.is_contact(true));
        assert!(RowPolarity::ActiveHigh.is_contact(true));
    }
}
