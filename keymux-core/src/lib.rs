//! Board-agnostic core logic for the keymux firmware
//!
//! This crate contains all logic that does not depend on a specific
//! microcontroller:
//!
//! - Hardware abstraction traits (keypad matrix, word sink, circular transfer)
//! - Per-key debouncing and the press/release event stream
//! - Column scanning driven by a periodic tick
//! - Numeric entry on top of the event stream
//! - Display buffers, LED/OLED layouts and a software circular replay
//! - Configuration type definitions
//!
//! # Data flow
//!
//! ```text
//! scan tick ──► KeypadMatrix::read_rows ──► Debouncer ──► EventQueue ──► readers
//!
//! application ──► DisplayBuffer ──► CircularTransfer ──► display peripheral
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod keypad;
pub mod traits;
