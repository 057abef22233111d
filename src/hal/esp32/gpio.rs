//! GPIO and edge interrupts on numbered pins through the ESP-IDF driver.
//!
//! Pins are addressed by GPIO number, matching [`crate::traits::Pin`], so
//! the raw `gpio_*` calls are used instead of typed `PinDriver`s.
//!
//! Edge interrupts go through the GPIO ISR service. Every subscribed pin
//! gets the same handler, which timestamps the edge and hands it to
//! [`on_speed_edge`](crate::encoder::on_speed_edge).

use core::ffi::c_void;

use esp_idf_hal::sys::{self, esp, EspError};

use super::Esp32Clock;
use crate::encoder;
use crate::traits::{Edge, EdgeInterrupt, Gpio, MicrosClock, Pin, Pull};

/// ESP32 GPIO.
///
/// Zero-sized; any number of copies can exist, including the one used
/// inside the interrupt handler.
///
/// # Example
///
/// ```ignore
/// use rs_drivers::hal::esp32::Esp32Gpio;
/// use rs_drivers::traits::Gpio;
///
/// let mut gpio = Esp32Gpio::new();
/// gpio.init_output(6)?;
/// gpio.write(6, true)?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Gpio;

impl Esp32Gpio {
    /// Creates a new GPIO handle.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Gpio for Esp32Gpio {
    type Error = EspError;

    fn init_output(&mut self, pin: Pin) -> Result<(), EspError> {
        let num = pin as sys::gpio_num_t;
        esp!(unsafe { sys::gpio_reset_pin(num) })?;
        esp!(unsafe { sys::gpio_set_direction(num, sys::gpio_mode_t_GPIO_MODE_INPUT_OUTPUT) })?;
        esp!(unsafe { sys::gpio_set_level(num, 0) })
    }

    fn init_input(&mut self, pin: Pin, pull: Pull) -> Result<(), EspError> {
        let num = pin as sys::gpio_num_t;
        let mode = match pull {
            Pull::None => sys::gpio_pull_mode_t_GPIO_FLOATING,
            Pull::Up => sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY,
            Pull::Down => sys::gpio_pull_mode_t_GPIO_PULLDOWN_ONLY,
        };
        esp!(unsafe { sys::gpio_reset_pin(num) })?;
        esp!(unsafe { sys::gpio_set_direction(num, sys::gpio_mode_t_GPIO_MODE_INPUT) })?;
        esp!(unsafe { sys::gpio_set_pull_mode(num, mode) })
    }

    #[inline]
    fn write(&mut self, pin: Pin, high: bool) -> Result<(), EspError> {
        esp!(unsafe { sys::gpio_set_level(pin as sys::gpio_num_t, high as u32) })
    }

    #[inline]
    fn is_high(&self, pin: Pin) -> bool {
        // Safe: level read has no side effects and is ISR-safe
        unsafe { sys::gpio_get_level(pin as sys::gpio_num_t) != 0 }
    }
}

impl EdgeInterrupt for Esp32Gpio {
    type Error = EspError;

    fn enable_edge_interrupt(&mut self, pin: Pin, edge: Edge) -> Result<(), EspError> {
        install_isr_service()?;

        let num = pin as sys::gpio_num_t;
        let intr = match edge {
            Edge::Falling => sys::gpio_int_type_t_GPIO_INTR_NEGEDGE,
            Edge::Rising => sys::gpio_int_type_t_GPIO_INTR_POSEDGE,
        };
        esp!(unsafe { sys::gpio_set_intr_type(num, intr) })?;
        esp!(unsafe {
            sys::gpio_isr_handler_add(num, Some(speed_edge_isr), pin as usize as *mut c_void)
        })?;
        esp!(unsafe { sys::gpio_intr_enable(num) })?;

        log::debug!("edge interrupt enabled on gpio {} ({:?})", pin, edge);
        Ok(())
    }
}

/// Install the per-pin ISR service once; later calls are no-ops.
fn install_isr_service() -> Result<(), EspError> {
    let err = unsafe { sys::gpio_install_isr_service(0) };
    if err == sys::ESP_ERR_INVALID_STATE as sys::esp_err_t {
        return Ok(());
    }
    esp!(err)
}

unsafe extern "C" fn speed_edge_isr(arg: *mut c_void) {
    let pin = arg as usize as Pin;
    let now_us = Esp32Clock.now_us();
    encoder::on_speed_edge(&Esp32Gpio, pin, now_us);
}
