//! Display buffers
//!
//! A display is refreshed by replaying a fixed-length buffer of 16-bit words
//! to its peripheral, over and over. The application edits cells in place;
//! the transfer only ever reads them.
//!
//! Cells are atomics so a `static` buffer can be shared between the
//! application and a transfer without a lock. An `AtomicU16` has the same
//! in-memory layout as a `u16`, so the buffer can also be handed to a DMA
//! channel as a plain array of half-words.

pub mod led;
pub mod oled;
pub mod replay;

pub use replay::{ReplayError, SoftwareReplay};

use core::sync::atomic::{AtomicU16, Ordering};

/// Errors from buffer and layout edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Cell, line or digit index past the end of the buffer
    OutOfRange,
}

/// Fixed-length buffer of display words
pub struct DisplayBuffer<const N: usize> {
    cells: [AtomicU16; N],
}

impl<const N: usize> DisplayBuffer<N> {
    /// Create a buffer holding `words`
    pub const fn new(words: [u16; N]) -> Self {
        let mut cells = [const { AtomicU16::new(0) }; N];
        let mut i = 0;
        while i < N {
            cells[i] = AtomicU16::new(words[i]);
            i += 1;
        }
        Self { cells }
    }

    /// Number of cells; fixed for the buffer's lifetime
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the buffer has no cells
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Read one cell
    pub fn get(&self, index: usize) -> Option<u16> {
        self.cells.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    /// Overwrite one cell
    pub fn set(&self, index: usize, word: u16) -> Result<(), BufferError> {
        let cell = self.cells.get(index).ok_or(BufferError::OutOfRange)?;
        cell.store(word, Ordering::Relaxed);
        Ok(())
    }

    /// Overwrite consecutive cells starting at `offset`
    ///
    /// Nothing is written if the words don't fit.
    pub fn write(&self, offset: usize, words: &[u16]) -> Result<(), BufferError> {
        let end = offset
            .checked_add(words.len())
            .filter(|&end| end <= N)
            .ok_or(BufferError::OutOfRange)?;

        for (cell, &word) in self.cells[offset..end].iter().zip(words) {
            cell.store(word, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Copy of every cell, in order
    pub fn snapshot(&self) -> [u16; N] {
        let mut words = [0u16; N];
        for (word, cell) in words.iter_mut().zip(self.cells.iter()) {
            *word = cell.load(Ordering::Relaxed);
        }
        words
    }

    /// Address of the first cell, for programming a DMA channel
    pub fn as_ptr(&self) -> *const u16 {
        self.cells.as_ptr().cast()
    }
}

/// Decoded display word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cell {
    /// Controls cursor position or display mode
    Command(u8),
    /// Produces a visible glyph
    Character(u8),
}

/// Where a display keeps its command/character tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WordFormat {
    /// Bit set on character words, clear on command words
    pub data_flag: u16,
}

impl WordFormat {
    /// Encode a command word
    pub const fn command(self, command: u8) -> u16 {
        command as u16
    }

    /// Encode a character word
    pub const fn character(self, ch: u8) -> u16 {
        self.data_flag | ch as u16
    }

    /// Encode a cell
    pub const fn encode(self, cell: Cell) -> u16 {
        match cell {
            Cell::Command(c) => self.command(c),
            Cell::Character(c) => self.character(c),
        }
    }

    /// Classify a word
    pub const fn decode(self, word: u16) -> Cell {
        if word & self.data_flag != 0 {
            Cell::Character(word as u8)
        } else {
            Cell::Command(word as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_set_get() {
        let buffer = DisplayBuffer::new([1, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(1), Some(2));

        buffer.set(1, 20).unwrap();
        assert_eq!(buffer.snapshot(), [1, 20, 3]);
        assert_eq!(buffer.set(3, 0), Err(BufferError::OutOfRange));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn test_buffer_write_range() {
        let buffer = DisplayBuffer::new([0u16; 4]);
        buffer.write(1, &[7, 8]).unwrap();
        assert_eq!(buffer.snapshot(), [0, 7, 8, 0]);

        // Overlong writes leave the buffer unchanged
        assert_eq!(buffer.write(3, &[9, 9]), Err(BufferError::OutOfRange));
        assert_eq!(buffer.snapshot(), [0, 7, 8, 0]);
    }

    #[test]
    fn test_buffer_static_init() {
        static BUFFER: DisplayBuffer<2> = DisplayBuffer::new([0xAA, 0x55]);
        assert_eq!(BUFFER.snapshot(), [0xAA, 0x55]);
        assert!(!BUFFER.as_ptr().is_null());
    }

    #[test]
    fn test_word_format() {
        let format = WordFormat { data_flag: 0x200 };
        assert_eq!(format.character(b'E'), 0x245);
        assert_eq!(format.command(0xC0), 0x0C0);
        assert_eq!(format.decode(0x245), Cell::Character(b'E'));
        assert_eq!(format.decode(0x002), Cell::Command(0x02));
        assert_eq!(format.encode(Cell::Character(b'!')), 0x221);
    }
}
