//! Circular DMA from a display buffer to a peripheral data register
//!
//! The channel walks the buffer one 16-bit word per request and wraps to
//! the first word after the last, forever. The CPU only ever edits the
//! buffer; nothing in this module runs after [`arm`](CircularTransfer::arm).

use embassy_stm32::pac;
use embassy_stm32::pac::bdma::vals::{Dir, Size};
use keymux_core::display::DisplayBuffer;
use keymux_core::traits::{CircularTransfer, TransferState};

/// DMA1 channel, numbered from 1 as in the reference manual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaChannel(u8);

impl DmaChannel {
    /// Channel 3 (SPI1_TX)
    pub const SPI1_TX: Self = Self(3);
    /// Channel 5 (SPI2_TX, also TIM15_UP)
    pub const SPI2_TX: Self = Self(5);
    /// Channel 5 when paced by TIM15 update events
    pub const TIM15_UP: Self = Self(5);

    /// Register block index (channel 1 is index 0)
    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// Error from circular DMA setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// The channel is already running
    AlreadyArmed,
    /// Buffer length is zero or does not fit the transfer counter
    BufferLength,
}

/// One DMA1 channel feeding a fixed peripheral register
pub struct CircularDma {
    channel: DmaChannel,
    peripheral: u32,
    state: TransferState,
}

impl CircularDma {
    /// Create an idle transfer into `peripheral` (a data register address)
    pub fn new(channel: DmaChannel, peripheral: *mut u16) -> Self {
        Self {
            channel,
            peripheral: peripheral as u32,
            state: TransferState::Idle,
        }
    }

    /// Channel in use
    pub fn channel(&self) -> DmaChannel {
        self.channel
    }
}

impl<const N: usize> CircularTransfer<'static, N> for CircularDma {
    type Error = DmaError;

    fn arm(&mut self, buffer: &'static DisplayBuffer<N>) -> Result<(), DmaError> {
        if self.state == TransferState::Running {
            return Err(DmaError::AlreadyArmed);
        }
        if N == 0 || N > u16::MAX as usize {
            return Err(DmaError::BufferLength);
        }

        let ch = pac::DMA1.ch(self.channel.index());

        // Registers are only writable while the channel is off
        ch.cr().modify(|w| w.set_en(false));
        ch.par().write_value(self.peripheral);
        ch.mar().write_value(buffer.as_ptr() as u32);
        ch.ndtr().write(|w| w.set_ndt(N as u16));
        ch.cr().write(|w| {
            w.set_dir(Dir::FROM_MEMORY);
            w.set_minc(true);
            w.set_pinc(false);
            w.set_msize(Size::BITS16);
            w.set_psize(Size::BITS16);
            w.set_circ(true);
        });
        ch.cr().modify(|w| w.set_en(true));

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "DMA1 channel {} circular over {} words",
            self.channel.0,
            N
        );

        self.state = TransferState::Running;
        Ok(())
    }

    fn state(&self) -> TransferState {
        self.state
    }
}
