//! Configuration types
//!
//! Board-agnostic keypad and display configuration.

pub mod types;

pub use types::*;
