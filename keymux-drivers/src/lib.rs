//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in keymux-core on top of `embedded-hal` 1.0:
//!
//! - Keypad matrix over four column outputs and four row inputs
//! - Bit-banged serial writer for the LED array

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod error;
pub mod matrix;

pub use error::PinError;
