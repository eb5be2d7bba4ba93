//! Hardware abstraction traits
//!
//! These traits define the interface between the keypad/display logic
//! and board-specific implementations.

pub mod display;
pub mod keypad;

pub use display::{CircularTransfer, TransferState, WordSink};
pub use keypad::KeypadMatrix;
