//! Display tasks and bring-up
//!
//! DMA-fed displays need no task at all once armed. The two software paths
//! do: the bit-banged LED array replays its buffer one word per
//! millisecond, and a directly driven OLED is drawn once at start and then
//! rewritten whenever the application marks the buffer dirty.

use defmt::*;
use embassy_stm32::gpio::Output;
use embassy_time::{block_for, Delay, Duration, Timer};

use keymux_core::display::led::LED_DIGITS;
use keymux_core::display::oled::{self, InitStep, OLED_FORMAT, OLED_INIT_SEQUENCE};
use keymux_core::display::SoftwareReplay;
use keymux_core::traits::WordSink;
use keymux_drivers::display::BitBangWriter;
use keymux_hal_stm32f0::RawSpiWriter;

use crate::channels::{OLED_BUFFER, OLED_DIRTY};

/// Pause between LED words on the bit-bang path
const LED_WORD_INTERVAL_MS: u64 = 1;

/// LED array replay over CS/SCK/SDI GPIO
pub type LedReplay = SoftwareReplay<
    'static,
    BitBangWriter<Output<'static>, Output<'static>, Output<'static>, Delay>,
    LED_DIGITS,
>;

/// Send the controller's init sequence, blocking through its delays
pub fn init_oled<S: WordSink>(sink: &mut S) -> Result<(), S::Error> {
    for step in OLED_INIT_SEQUENCE {
        match step {
            InitStep::Command(command) => sink.write_word(OLED_FORMAT.command(command))?,
            InitStep::DelayUs(us) => block_for(Duration::from_micros(us as u64)),
        }
    }
    debug!("OLED init sequence sent");
    Ok(())
}

#[embassy_executor::task]
pub async fn led_bitbang_task(mut replay: LedReplay) {
    info!("LED bit-bang task started");

    loop {
        if let Err(e) = replay.step() {
            warn!("LED word not sent: {}", e);
        }
        Timer::after_millis(LED_WORD_INTERVAL_MS).await;
    }
}

#[embassy_executor::task]
pub async fn oled_direct_task(mut writer: RawSpiWriter) {
    info!("OLED direct task started");

    // Draw whatever is already buffered (the boot banner) before waiting
    loop {
        oled::write_buffer_direct(&mut writer, &OLED_BUFFER).ok();
        trace!("OLED rewritten");

        OLED_DIRTY.wait().await;
    }
}
