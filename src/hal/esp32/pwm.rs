//! Motor PWM using the ESP32 LEDC peripheral.
//!
//! LEDC channels are bound to their GPIO when the [`LedcDriver`] is built,
//! so an [`Esp32Pwm`] serves exactly one pin. The clock divisor requested
//! through [`Pwm::init`] has no LEDC equivalent; frequency and resolution
//! come from the [`LedcTimerDriver`](esp_idf_hal::ledc::LedcTimerDriver)
//! configuration instead.

use esp_idf_hal::ledc::LedcDriver;
use esp_idf_hal::sys::{esp_err_t, EspError, ESP_ERR_INVALID_ARG};

use crate::traits::{Pin, Pwm};

/// Single-pin LEDC PWM output.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
/// use esp_idf_hal::prelude::*;
/// use rs_drivers::hal::esp32::Esp32Pwm;
///
/// let peripherals = Peripherals::take()?;
/// let timer = LedcTimerDriver::new(
///     peripherals.ledc.timer0,
///     &TimerConfig::default()
///         .frequency(20.kHz().into())
///         .resolution(Resolution::Bits10),
/// )?;
/// let channel = LedcDriver::new(peripherals.ledc.channel0, &timer, peripherals.pins.gpio2)?;
/// let pwm = Esp32Pwm::new(2, channel);
/// ```
pub struct Esp32Pwm<'d> {
    pin: Pin,
    driver: LedcDriver<'d>,
}

impl<'d> Esp32Pwm<'d> {
    /// Wrap a channel already routed to GPIO `pin`.
    pub fn new(pin: Pin, driver: LedcDriver<'d>) -> Self {
        Self { pin, driver }
    }

    /// GPIO the channel drives.
    #[inline]
    pub fn pin(&self) -> Pin {
        self.pin
    }

    fn check_pin(&self, pin: Pin) -> Result<(), EspError> {
        if pin == self.pin {
            Ok(())
        } else {
            log::error!("ledc channel is bound to gpio {}, not {}", self.pin, pin);
            Err(EspError::from_infallible::<{ ESP_ERR_INVALID_ARG as esp_err_t }>())
        }
    }
}

impl Pwm for Esp32Pwm<'_> {
    type Error = EspError;

    fn full_scale(&self) -> u16 {
        self.driver.get_max_duty().min(u16::MAX as u32) as u16
    }

    fn init(&mut self, pin: Pin, clock_divisor: f32) -> Result<(), EspError> {
        self.check_pin(pin)?;
        log::debug!(
            "ledc on gpio {}: clock divisor {} ignored, timer config applies",
            pin,
            clock_divisor
        );
        self.driver.set_duty(0)
    }

    fn set_enabled(&mut self, pin: Pin, enabled: bool) -> Result<(), EspError> {
        self.check_pin(pin)?;
        if enabled {
            self.driver.enable()
        } else {
            self.driver.disable()
        }
    }

    fn set_level(&mut self, pin: Pin, level: u16) -> Result<(), EspError> {
        self.check_pin(pin)?;
        self.driver.set_duty(level as u32)
    }
}
