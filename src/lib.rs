//! # rs-drivers
//!
//! Peripheral drivers for a small robot: a DC gear motor with hall encoder
//! feedback and a 74HC595 serial-in/parallel-out shift register.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for GPIO, PWM, edge interrupts, clock and delays
//! - **Motor control**: Direction via H-bridge pins, open-loop PWM duty cycle
//! - **Encoder feedback**: Interrupt-driven RPM, direction and revolution count
//! - **Shift register**: MSB-first byte writes, latching, hardware or shifted clear
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Platform abstractions the drivers call into
//! - `encoder` - Interrupt-side feedback and the speed-pin registry
//! - `motor` - Motor controller
//! - `shift_register` - Shift register controller
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_drivers::{
//!     MotorConfig, MotorController, MotorPins,
//!     ShiftRegister, ShiftRegisterConfig, ShiftRegisterPins,
//!     encoder::EncoderRegistry,
//!     hal::{MockDelay, MockGpio, MockPwm},
//! };
//!
//! static ENCODERS: EncoderRegistry<1> = EncoderRegistry::new();
//!
//! // Motor with encoder feedback
//! let pins = MotorPins { pwm: 2, power_a: 3, power_b: 4, direction_sense: 5, speed_sense: 6 };
//! let mut motor = MotorController::with_registry(
//!     MockGpio::new(),
//!     MockPwm::new(),
//!     pins,
//!     MotorConfig::default(),
//!     &ENCODERS,
//! )
//! .unwrap();
//! motor.set_direction(true).unwrap();
//! motor.set_duty_percent(40.0).unwrap();
//!
//! // Shift register with autostore
//! let mut leds = ShiftRegister::new(
//!     MockGpio::new(),
//!     MockDelay::new(),
//!     ShiftRegisterPins::new(7, 8, 9),
//!     ShiftRegisterConfig::default(),
//! )
//! .unwrap();
//! leds.write(0b1010_0101).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Driver configuration and device constants.
pub mod config;
/// Interrupt-driven encoder feedback and the speed-pin registry.
pub mod encoder;
/// Construction error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// DC motor controller with encoder feedback.
pub mod motor;
/// 74HC595 shift register controller.
pub mod shift_register;
/// Core traits for platform abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{MotorConfig, ShiftRegisterConfig, BIT_SETTLE_US, MIN_PULSE_WIDTH_US};
pub use encoder::{on_speed_edge, EncoderFeedback, EncoderRegistry, ENCODERS};
pub use error::{MotorError, RegistryError};
pub use motor::{MotorController, MotorPins, MotorStatus};
pub use shift_register::{ShiftRegister, ShiftRegisterPins};
pub use traits::{DelayUs, Edge, EdgeInterrupt, Gpio, MicrosClock, Pin, Pull, Pwm};
