//! ESP32 clock and busy-wait delay using the ESP-IDF timer and ROM delay.

use crate::traits::{DelayUs, MicrosClock};
use embedded_hal::delay::DelayNs;
use esp_idf_hal::delay::Ets;

/// ESP32 clock using the hardware timer.
///
/// `esp_timer_get_time()` returns a 64-bit microsecond count since boot;
/// it is truncated to the 32-bit wrapping counter the encoder math expects.
///
/// # Example
///
/// ```ignore
/// use rs_drivers::hal::esp32::Esp32Clock;
/// use rs_drivers::traits::MicrosClock;
///
/// let clock = Esp32Clock::new();
/// let start = clock.now_us();
/// // ... do work ...
/// let elapsed = clock.now_us().wrapping_sub(start);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl MicrosClock for Esp32Clock {
    #[inline]
    fn now_us(&self) -> u32 {
        // Safe: this is a simple read of the hardware timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        micros as u32
    }
}

/// Busy-wait delay backed by the ROM `ets_delay_us` routine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Delay;

impl Esp32Delay {
    /// Creates a new delay provider.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl DelayUs for Esp32Delay {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        DelayNs::delay_us(&mut Ets, us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        DelayNs::delay_ms(&mut Ets, ms);
    }
}
