//! Keypad row/column adapter trait

use crate::keypad::{Column, RowSample};

/// Row/column I/O for a multiplexed keypad
///
/// Implementations own the four column outputs and four row inputs and
/// hide the electrical polarity: a set bit in the returned [`RowSample`]
/// always means "contact", whether the hardware is active-high or
/// active-low.
pub trait KeypadMatrix {
    /// Error type for pin access
    type Error;

    /// Energize `column` and release all other columns
    fn drive_column(&mut self, column: Column) -> Result<(), Self::Error>;

    /// Sample the four row inputs against the currently driven column
    fn read_rows(&mut self) -> Result<RowSample, Self::Error>;
}
