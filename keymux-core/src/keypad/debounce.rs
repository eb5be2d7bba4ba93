//! Per-key debounce history
//!
//! Every key owns a small shift register of its most recent raw samples.
//! A key is only reported as changed once the last `depth` samples agree:
//!
//! ```text
//! depth = 3, mask = 0b111
//!
//! sample:   1   0   1   1   1   1   0   0   0
//! history: 001 010 101 011 111 111 110 100 000
//! event:                    ^Pressed        ^Released
//! ```
//!
//! Histories that are neither all-ones nor all-zeros are bouncing and never
//! produce an event. A key's history only advances on ticks that drive its
//! column, so it is updated once per full column cycle.

use super::{Column, Direction, Key, KeyEvent, RowSample, NUM_KEYS, NUM_ROWS};

/// Longest supported history (bits in a `u8`)
pub const MAX_DEBOUNCE_DEPTH: u8 = 8;

/// Debounce and event engine for the whole matrix
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Raw sample history per key, newest sample in bit 0
    history: [u8; NUM_KEYS],
    /// Last reported logical state, one bit per key index
    reported: u16,
    /// Low `depth` bits set
    mask: u8,
    /// Sequence number given to the next event
    sequence: u32,
}

impl Debouncer {
    /// Create a debouncer requiring `depth` consistent samples
    ///
    /// `depth` is clamped to `1..=8`.
    pub const fn new(depth: u8) -> Self {
        let depth = if depth == 0 {
            1
        } else if depth > MAX_DEBOUNCE_DEPTH {
            MAX_DEBOUNCE_DEPTH
        } else {
            depth
        };
        let mask = if depth == MAX_DEBOUNCE_DEPTH {
            0xFF
        } else {
            (1u8 << depth) - 1
        };

        Self {
            history: [0; NUM_KEYS],
            reported: 0,
            mask,
            sequence: 0,
        }
    }

    /// Number of consecutive samples required for a state change
    pub fn depth(&self) -> u8 {
        self.mask.count_ones() as u8
    }

    /// Record the rows sampled while `column` was driven
    ///
    /// Calls `emit` once for every key of that column whose debounced state
    /// changed, in row order. Returns the number of events emitted.
    pub fn on_tick(
        &mut self,
        column: Column,
        rows: RowSample,
        mut emit: impl FnMut(KeyEvent),
    ) -> usize {
        let mut emitted = 0;

        for row in 0..NUM_ROWS as u8 {
            let key = Key { column, row };
            let index = key.index();
            let bit = 1u16 << index;

            let history = (self.history[index] << 1) | rows.is_active(row) as u8;
            self.history[index] = history;

            let was_pressed = self.reported & bit != 0;
            let direction = match history & self.mask {
                m if m == self.mask && !was_pressed => Direction::Pressed,
                0 if was_pressed => Direction::Released,
                _ => continue,
            };

            self.reported ^= bit;
            emit(KeyEvent {
                key,
                direction,
                sequence: self.sequence,
            });
            self.sequence = self.sequence.wrapping_add(1);
            emitted += 1;
        }

        emitted
    }

    /// Last reported logical state of a key
    pub fn is_pressed(&self, key: Key) -> bool {
        self.reported & (1 << key.index()) != 0
    }

    /// Bitmask of all keys currently reported as pressed, indexed by [`Key::index`]
    pub fn pressed_mask(&self) -> u16 {
        self.reported
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DEBOUNCE_DEPTH)
    }
}
