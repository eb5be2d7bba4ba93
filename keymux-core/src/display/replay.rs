//! Software circular replay
//!
//! Streams a [`DisplayBuffer`] through any [`WordSink`] one word per
//! [`step`](SoftwareReplay::step), wrapping at the end. The caller decides
//! the pacing (the LED array bit-bang path waits 1 ms between words).
//!
//! The buffer is copied at the start of every pass, so an edit made
//! mid-pass shows up from the next pass onward, never halfway through one.

use super::DisplayBuffer;
use crate::traits::{CircularTransfer, TransferState, WordSink};

/// Errors from the software replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplayError<E> {
    /// `step` called before `arm`
    NotArmed,
    /// `arm` called on a running replay
    AlreadyArmed,
    /// Buffer has no cells
    EmptyBuffer,
    /// The sink rejected a word; the same word is retried on the next step
    Sink(E),
}

/// Circular transfer driven by software
pub struct SoftwareReplay<'a, S, const N: usize> {
    sink: S,
    buffer: Option<&'a DisplayBuffer<N>>,
    /// Words for the pass in progress
    pass: [u16; N],
    cursor: usize,
    passes: u32,
}

impl<'a, S: WordSink, const N: usize> SoftwareReplay<'a, S, N> {
    /// Create an idle replay that will write to `sink`
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            buffer: None,
            pass: [0; N],
            cursor: 0,
            passes: 0,
        }
    }

    /// Send the next word
    ///
    /// Returns the word sent.
    pub fn step(&mut self) -> Result<u16, ReplayError<S::Error>> {
        let buffer = self.buffer.ok_or(ReplayError::NotArmed)?;

        if self.cursor == 0 {
            self.pass = buffer.snapshot();
        }

        let word = self.pass[self.cursor];
        self.sink.write_word(word).map_err(ReplayError::Sink)?;

        self.cursor += 1;
        if self.cursor == N {
            self.cursor = 0;
            self.passes = self.passes.wrapping_add(1);
        }
        Ok(word)
    }

    /// Send words until the current pass is complete
    pub fn finish_pass(&mut self) -> Result<(), ReplayError<S::Error>> {
        loop {
            self.step()?;
            if self.cursor == 0 {
                return Ok(());
            }
        }
    }

    /// Completed passes over the buffer (wraps)
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Get access to the underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<'a, S: WordSink, const N: usize> CircularTransfer<'a, N> for SoftwareReplay<'a, S, N> {
    type Error = ReplayError<S::Error>;

    fn arm(&mut self, buffer: &'a DisplayBuffer<N>) -> Result<(), Self::Error> {
        if self.buffer.is_some() {
            return Err(ReplayError::AlreadyArmed);
        }
        if N == 0 {
            return Err(ReplayError::EmptyBuffer);
        }
        self.buffer = Some(buffer);
        self.cursor = 0;
        Ok(())
    }

    fn state(&self) -> TransferState {
        if self.buffer.is_some() {
            TransferState::Running
        } else {
            TransferState::Idle
        }
    }
}
