//! Matrix keypad input
//!
//! A 4×4 keypad is read one column at a time. Each scan tick samples the
//! four rows of the active column, feeds them to the [`Debouncer`] and
//! queues the resulting press/release events for the application.

pub mod debounce;
pub mod entry;
pub mod queue;
pub mod scanner;

pub use debounce::Debouncer;
pub use entry::{format_value, read_float, read_float_or, EntryError, EntryStep, NumericEntry};
pub use queue::{EventQueue, EventSink};
pub use scanner::{KeypadScanner, ScanError};

use crate::config::DEFAULT_KEYMAP;

/// Number of column (driven) lines
pub const NUM_COLS: usize = 4;

/// Number of row (sensed) lines
pub const NUM_ROWS: usize = 4;

/// Total number of keys on the matrix
pub const NUM_KEYS: usize = NUM_COLS * NUM_ROWS;

/// Index of a column line, always in `0..4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Column(u8);

impl Column {
    /// First column, energized at startup
    pub const FIRST: Column = Column(0);

    /// Create a column index, or `None` if out of range
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_COLS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Column index as a number
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The column scanned after this one
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % NUM_COLS as u8)
    }
}

/// Row lines sampled for one column
///
/// Bit `n` is set when row `n` is in contact with the driven column.
/// Only the low four bits are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RowSample(u8);

impl RowSample {
    /// No row in contact
    pub const NONE: RowSample = RowSample(0);

    /// Build a sample from a raw mask, discarding bits above row 3
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Raw row mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the given row is in contact
    pub const fn is_active(self, row: u8) -> bool {
        row < NUM_ROWS as u8 && self.0 & (1 << row) != 0
    }
}

/// Identity of one key: the column it is driven by and the row it is read on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key {
    /// Driven column
    pub column: Column,
    /// Sensed row (0-3)
    pub row: u8,
}

impl Key {
    /// Create a key identity, or `None` if the row is out of range
    pub const fn new(column: Column, row: u8) -> Option<Self> {
        if (row as usize) < NUM_ROWS {
            Some(Self { column, row })
        } else {
            None
        }
    }

    /// Dense index in `0..16`, column-major
    pub const fn index(self) -> usize {
        self.column.index() as usize * NUM_ROWS + self.row as usize
    }

    /// Character printed on the keycap, using the default keymap
    pub fn symbol(self) -> char {
        self.symbol_in(DEFAULT_KEYMAP)
    }

    /// Character for this key in a 16-character keymap indexed by [`Key::index`]
    ///
    /// Returns `'?'` when the keymap is shorter than expected.
    pub fn symbol_in(self, keymap: &str) -> char {
        keymap
            .as_bytes()
            .get(self.index())
            .map(|&b| b as char)
            .unwrap_or('?')
    }
}

/// Logical transition reported for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Pressed,
    Released,
}

/// A debounced key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Key that changed state
    pub key: Key,
    /// New logical state
    pub direction: Direction,
    /// Detection order, incremented for every emitted event (wraps)
    pub sequence: u32,
}

impl KeyEvent {
    /// Check if this is a press
    pub fn is_press(&self) -> bool {
        self.direction == Direction::Pressed
    }

    /// Check if this is a release
    pub fn is_release(&self) -> bool {
        self.direction == Direction::Released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_cycles() {
        let mut col = Column::FIRST;
        let mut seen = [0u8; 8];
        for slot in seen.iter_mut() {
            *slot = col.index();
            col = col.next();
        }
        assert_eq!(seen, [0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn test_column_range() {
        assert!(Column::new(3).is_some());
        assert!(Column::new(4).is_none());
    }

    #[test]
    fn test_row_sample_masks_high_bits() {
        let sample = RowSample::from_bits(0xF5);
        assert_eq!(sample.bits(), 0x05);
        assert!(sample.is_active(0));
        assert!(!sample.is_active(1));
        assert!(sample.is_active(2));
        assert!(!sample.is_active(7));
    }

    #[test]
    fn test_key_symbols() {
        let key = |c, r| Key::new(Column::new(c).unwrap(), r).unwrap();
        assert_eq!(key(0, 0).symbol(), 'D');
        assert_eq!(key(1, 0).symbol(), '#');
        assert_eq!(key(2, 3).symbol(), '2');
        assert_eq!(key(3, 3).symbol(), '1');
        assert_eq!(key(3, 0).symbol_in("short"), '?');
    }
}
