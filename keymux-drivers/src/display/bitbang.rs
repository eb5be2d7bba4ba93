//! Bit-banged serial writer
//!
//! Clocks 16-bit words out on three GPIO lines, most significant bit
//! first:
//!
//! ```text
//! CS   ‾‾\___________________________ ... ____/‾‾
//! SCK  ______/‾‾\______/‾‾\__________ ... ___________
//! SDI  ----<b15 >-----<b14 >--------- ... <b0 >-----
//! ```
//!
//! Data is set up half a period before the rising clock edge and held for
//! half a period after it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use keymux_core::traits::WordSink;

use crate::PinError;

/// Default half clock period (50 µs, 10 kHz bit clock)
pub const DEFAULT_HALF_PERIOD_NS: u32 = 50_000;

/// Serial writer on GPIO pins
pub struct BitBangWriter<CS, SCK, SDI, D> {
    cs: CS,
    sck: SCK,
    sdi: SDI,
    delay: D,
    half_period_ns: u32,
}

impl<CS, SCK, SDI, D> BitBangWriter<CS, SCK, SDI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    SDI: OutputPin,
    D: DelayNs,
{
    /// Take the pins and put the bus in its idle state (CS high, SCK low)
    pub fn new(cs: CS, sck: SCK, sdi: SDI, delay: D) -> Result<Self, PinError> {
        Self::with_half_period(cs, sck, sdi, delay, DEFAULT_HALF_PERIOD_NS)
    }

    /// Like [`new`](Self::new) with a custom half clock period
    pub fn with_half_period(
        mut cs: CS,
        mut sck: SCK,
        sdi: SDI,
        delay: D,
        half_period_ns: u32,
    ) -> Result<Self, PinError> {
        cs.set_high().map_err(|_| PinError::Drive)?;
        sck.set_low().map_err(|_| PinError::Drive)?;

        Ok(Self {
            cs,
            sck,
            sdi,
            delay,
            half_period_ns,
        })
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), PinError> {
        let result = if bit {
            self.sdi.set_high()
        } else {
            self.sdi.set_low()
        };
        result.map_err(|_| PinError::Drive)?;

        self.delay.delay_ns(self.half_period_ns);
        self.sck.set_high().map_err(|_| PinError::Drive)?;
        self.delay.delay_ns(self.half_period_ns);
        self.sck.set_low().map_err(|_| PinError::Drive)
    }

    /// Release the pins
    pub fn release(self) -> (CS, SCK, SDI, D) {
        (self.cs, self.sck, self.sdi, self.delay)
    }
}

impl<CS, SCK, SDI, D> WordSink for BitBangWriter<CS, SCK, SDI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    SDI: OutputPin,
    D: DelayNs,
{
    type Error = PinError;

    fn write_word(&mut self, word: u16) -> Result<(), PinError> {
        self.cs.set_low().map_err(|_| PinError::Drive)?;
        for bit in (0..16).rev() {
            self.write_bit(word & (1 << bit) != 0)?;
        }
        self.cs.set_high().map_err(|_| PinError::Drive)
    }
}
