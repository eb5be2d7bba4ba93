//! STM32F0-specific HAL for the keymux firmware
//!
//! Register-level helpers for the display paths that embassy-stm32 does not
//! cover directly: SPI masters with hardware NSS pulses and odd frame sizes,
//! DMA channels in circular mode, and a timer that paces DMA requests.
//!
//! # Features
//!
//! - `stm32f091rc` - Enable support for STM32F091RC
//! - `stm32f072rb` - Enable support for STM32F072RB
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Call `embassy_stm32::init` first. It enables the GPIO and DMA clocks
//! these helpers rely on.

#![no_std]

pub mod dma;
pub mod spi;
pub mod timer;

pub use dma::{CircularDma, DmaChannel, DmaError};
pub use spi::{FrameConfig, RawSpiWriter, SpiPort};
pub use timer::{DmaPacer, PacerError};
