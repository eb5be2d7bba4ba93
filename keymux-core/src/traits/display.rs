//! Display transmitter traits

use crate::display::DisplayBuffer;

/// A peripheral data path that accepts one display word at a time
///
/// Implemented by the bit-banged writer and by blocking SPI writers.
/// Word width is device-specific; unused high bits are ignored by the
/// device.
pub trait WordSink {
    /// Error type for the underlying bus
    type Error;

    /// Send a single word, waiting until the peripheral accepts it
    fn write_word(&mut self, word: u16) -> Result<(), Self::Error>;

    /// Send words in order
    fn write_words(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        for &word in words {
            self.write_word(word)?;
        }
        Ok(())
    }
}

impl<T: WordSink + ?Sized> WordSink for &mut T {
    type Error = T::Error;

    fn write_word(&mut self, word: u16) -> Result<(), Self::Error> {
        (**self).write_word(word)
    }
}

/// Lifecycle of a circular transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// Not yet armed
    #[default]
    Idle,
    /// Replaying the buffer; stays here until device reset
    Running,
}

/// Replays a [`DisplayBuffer`] to a display peripheral forever
///
/// After [`arm`](Self::arm) the transfer reads the buffer from its first
/// cell, wraps at its end and repeats indefinitely. The transfer never
/// writes to the buffer. Changes made by the application become visible on
/// a later pass; there is no guarantee about when inside a pass.
pub trait CircularTransfer<'a, const N: usize> {
    /// Error type for arming
    type Error;

    /// Start replaying `buffer`
    fn arm(&mut self, buffer: &'a DisplayBuffer<N>) -> Result<(), Self::Error>;

    /// Current lifecycle state
    fn state(&self) -> TransferState;

    /// Check if the transfer has been armed
    fn is_running(&self) -> bool {
        self.state() == TransferState::Running
    }
}
