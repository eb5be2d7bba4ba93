//! Driver errors

/// Error from a GPIO operation
///
/// The pin's own error type is discarded; embedded pin errors rarely carry
/// more than "the pin failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Setting an output failed
    Drive,
    /// Reading an input failed
    Sense,
}
