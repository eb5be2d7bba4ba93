//! SPI masters for the display paths
//!
//! Both displays latch a frame on the rising edge of NSS, so the SPI
//! peripheral drives NSS itself (SSOE) and pulses it between frames
//! (NSSP). The OLED takes 10-bit frames, the LED array 16-bit frames.
//!
//! | Port | SCK  | MOSI | NSS  |
//! |------|------|------|------|
//! | SPI1 | PA5  | PA7  | PA15 |
//! | SPI2 | PB13 | PB15 | PB12 |

use core::convert::Infallible;

use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals::Moder;
use embassy_stm32::pac::spi::vals::{Br, Ds, Mstr};
use keymux_core::traits::WordSink;

/// SPI peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiPort {
    Spi1,
    Spi2,
}

impl SpiPort {
    fn regs(self) -> pac::spi::Spi {
        match self {
            SpiPort::Spi1 => pac::SPI1,
            SpiPort::Spi2 => pac::SPI2,
        }
    }

    /// Data register address, for DMA
    pub fn data_register(self) -> *mut u16 {
        self.regs().dr16().as_ptr() as *mut u16
    }

    fn enable_clock(self) {
        match self {
            SpiPort::Spi1 => pac::RCC.apb2enr().modify(|w| w.set_spi1en(true)),
            SpiPort::Spi2 => pac::RCC.apb1enr().modify(|w| w.set_spi2en(true)),
        }
    }

    /// Route SCK, MOSI and NSS to the port (all alternate function 0)
    fn route_pins(self) {
        let (port, pins) = match self {
            SpiPort::Spi1 => (pac::GPIOA, [5usize, 7, 15]),
            SpiPort::Spi2 => (pac::GPIOB, [13usize, 15, 12]),
        };
        for pin in pins {
            port.afr(pin / 8).modify(|w| w.set_afr(pin % 8, 0));
            port.moder().modify(|w| w.set_moder(pin, Moder::ALTERNATE));
        }
    }
}

/// Frame setup for one port
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameConfig {
    /// Bits per frame (4..=16)
    pub bits: u8,
    /// Raise a DMA request whenever the transmit buffer empties
    pub tx_dma: bool,
}

impl FrameConfig {
    /// 10-bit frames for the character OLED
    pub const OLED: Self = Self {
        bits: 10,
        tx_dma: true,
    };

    /// 16-bit frames for the LED array
    pub const LED: Self = Self {
        bits: 16,
        tx_dma: true,
    };

    /// Same frame, without TX DMA requests (for a timer-paced channel)
    pub const fn without_dma(self) -> Self {
        Self {
            bits: self.bits,
            tx_dma: false,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::LED
    }
}

/// Bring up `port` as a transmit-only master at the slowest baud rate
pub fn init_master(port: SpiPort, config: FrameConfig) {
    let bits = config.bits.clamp(4, 16);

    port.enable_clock();
    port.route_pins();

    let regs = port.regs();
    regs.cr1().modify(|w| w.set_spe(false));
    regs.cr1().modify(|w| {
        w.set_br(Br::DIV256);
        w.set_mstr(Mstr::MASTER);
    });
    regs.cr2().modify(|w| {
        w.set_ds(Ds::from_bits(bits - 1));
        w.set_ssoe(true);
        w.set_nssp(true);
        w.set_txdmaen(config.tx_dma);
    });
    regs.cr1().modify(|w| w.set_spe(true));

    #[cfg(feature = "defmt")]
    defmt::info!("{} master, {}-bit frames, dma={}", port, bits, config.tx_dma);
}

/// Polled writer for a port brought up by [`init_master`]
///
/// Used for OLED init commands and for directly driven displays.
pub struct RawSpiWriter {
    port: SpiPort,
}

impl RawSpiWriter {
    pub fn new(port: SpiPort) -> Self {
        Self { port }
    }
}

impl WordSink for RawSpiWriter {
    type Error = Infallible;

    fn write_word(&mut self, word: u16) -> Result<(), Infallible> {
        let regs = self.port.regs();
        while !regs.sr().read().txe() {}
        // SAFETY: 16-bit write to the data register of an enabled master
        unsafe { core::ptr::write_volatile(self.port.data_register(), word) };
        while regs.sr().read().bsy() {}
        Ok(())
    }
}
