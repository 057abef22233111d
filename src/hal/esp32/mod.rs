//! ESP32-C3 SuperMini hardware abstraction layer.
//!
//! This module implements the platform traits on top of ESP-IDF:
//!
//! - [`Esp32Gpio`]: numbered GPIO plus the shared edge ISR that feeds
//!   [`ENCODERS`](crate::encoder::ENCODERS)
//! - [`Esp32Pwm`]: one LEDC channel per motor
//! - [`Esp32Clock`] / [`Esp32Delay`]: `esp_timer` and ROM busy-wait
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for the GPIO numbers used by `esp32_main`.

mod clock;
mod gpio;
mod pwm;

pub use clock::{Esp32Clock, Esp32Delay};
pub use gpio::Esp32Gpio;
pub use pwm::Esp32Pwm;

/// Pin assignments for SuperMini ESP32-C3.
///
/// - Motor via L298N on GPIO2-6
/// - 74HC595 on GPIO7-10 (output enable tied low)
pub mod pins {
    use crate::traits::Pin;

    // =========================================================================
    // Motor (L298N + MG310P20 encoder)
    // =========================================================================

    /// PWM to L298N ENA
    pub const MOTOR_PWM: Pin = 2;

    /// L298N IN1
    pub const MOTOR_POWER_A: Pin = 3;

    /// L298N IN2
    pub const MOTOR_POWER_B: Pin = 4;

    /// Encoder direction output (white)
    pub const MOTOR_DIR: Pin = 5;

    /// Encoder pulse output (yellow)
    pub const MOTOR_SPEED: Pin = 6;

    // =========================================================================
    // Shift register (74HC595)
    // =========================================================================

    /// DS / SER
    pub const SR_DATA: Pin = 7;

    /// SH_CP / SRCLK
    pub const SR_SHIFT: Pin = 8;

    /// ST_CP / RCLK
    pub const SR_STORE: Pin = 9;

    /// MR / SRCLR
    pub const SR_RECLEAR: Pin = 10;
}
