//! Trait definitions for the platform services the drivers call into.
//!
//! This module defines the abstractions that allow rs-drivers to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Record and verify every pin transition in host tests
//!
//! # Submodules
//!
//! - `hardware`: GPIO, edge interrupts, PWM, microsecond clock, delays
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`Gpio`]: Numbered digital pins
//! - [`EdgeInterrupt`]: Edge interrupt subscription
//! - [`Pwm`]: Duty-cycle output
//! - [`MicrosClock`]: Time source for encoder edge timing
//! - [`DelayUs`]: Busy-wait delays for pulse timing

pub mod hardware;

pub use hardware::*;
