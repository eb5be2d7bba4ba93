//! Keypad matrix implementations

pub mod pins;

pub use pins::PinMatrix;
