//! TIM15 as a DMA pacer
//!
//! With the update DMA request enabled, every counter overflow asks DMA1
//! channel 5 for one transfer. Pointing that channel at SPI2 gives a
//! hardware-timed word stream with no SPI TX requests involved.

use embassy_stm32::pac;

/// Counter tick rate after the prescaler
const TICK_HZ: u32 = 10_000;

/// Error from pacer setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacerError {
    /// Requested rate is zero or above the counter tick rate
    Rate,
    /// Timer clock is not a multiple of the counter tick rate
    Clock,
}

/// TIM15 update events at a fixed rate
pub struct DmaPacer {
    prescaler: u16,
    reload: u16,
}

impl DmaPacer {
    /// Compute dividers for `rate_hz` requests per second
    pub fn new(timer_clock_hz: u32, rate_hz: u32) -> Result<Self, PacerError> {
        let (prescaler, reload) = dividers(timer_clock_hz, rate_hz)?;
        Ok(Self { prescaler, reload })
    }

    /// Enable TIM15 and start raising update DMA requests
    pub fn start(&self) {
        pac::RCC.apb2enr().modify(|w| w.set_tim15en(true));

        let tim = pac::TIM15;
        tim.cr1().modify(|w| w.set_cen(false));
        tim.psc().write_value(self.prescaler);
        tim.arr().write(|w| w.set_arr(self.reload));
        tim.dier().modify(|w| w.set_ude(true));
        tim.cr1().modify(|w| w.set_cen(true));

        #[cfg(feature = "defmt")]
        defmt::info!("TIM15 pacer psc={} arr={}", self.prescaler, self.reload);
    }
}

/// Prescaler and auto-reload values, both already minus one
fn dividers(timer_clock_hz: u32, rate_hz: u32) -> Result<(u16, u16), PacerError> {
    if rate_hz == 0 || rate_hz > TICK_HZ {
        return Err(PacerError::Rate);
    }
    if timer_clock_hz < TICK_HZ || timer_clock_hz % TICK_HZ != 0 {
        return Err(PacerError::Clock);
    }

    let prescaler = timer_clock_hz / TICK_HZ - 1;
    let reload = TICK_HZ / rate_hz - 1;
    if prescaler > u16::MAX as u32 {
        return Err(PacerError::Clock);
    }
    Ok((prescaler as u16, reload as u16))
}
