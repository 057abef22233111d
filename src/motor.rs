//! DC motor driver with H-bridge direction pins, PWM speed and encoder feedback.
//!
//! This module provides [`MotorController`], an open-loop driver for a
//! brushed gear motor behind an L298N-style H-bridge:
//!
//! - two power pins select the bridge polarity (rotation direction)
//! - one PWM pin sets the duty cycle
//! - the motor's hall encoder reports direction on one input and a pulse
//!   train on another; the pulse train is timed from interrupt context
//!   (see [`crate::encoder`])
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::{MotorConfig, MotorController, MotorPins};
//! use rs_drivers::encoder::EncoderRegistry;
//! use rs_drivers::hal::{MockGpio, MockPwm};
//!
//! static REGISTRY: EncoderRegistry<1> = EncoderRegistry::new();
//!
//! let pins = MotorPins {
//!     pwm: 2,
//!     power_a: 3,
//!     power_b: 4,
//!     direction_sense: 5,
//!     speed_sense: 6,
//! };
//! let mut motor = MotorController::with_registry(
//!     MockGpio::new(),
//!     MockPwm::new(),
//!     pins,
//!     MotorConfig::default(),
//!     &REGISTRY,
//! )
//! .unwrap();
//!
//! motor.set_direction(true).unwrap();
//! motor.set_duty_percent(40.0).unwrap();
//!
//! // Encoder edges arrive from the GPIO interrupt
//! REGISTRY.dispatch(motor.gpio(), 6, 0);
//! REGISTRY.dispatch(motor.gpio(), 6, 50_000);
//!
//! let status = motor.status();
//! assert_eq!(status.duty_percent, 40.0);
//! assert!(status.rpm > 0.0);
//! ```
//!
//! # Caution
//!
//! The driver performs no interlocks. Reversing direction while the motor
//! is spinning reverses the bridge immediately; decelerate first. Duty
//! values in the low single digits will usually stall the motor.

use crate::config::MotorConfig;
use crate::encoder::{EncoderFeedback, EncoderRegistry, ENCODERS};
use crate::error::MotorError;
use crate::traits::{Edge, EdgeInterrupt, Gpio, Pin, Pull, Pwm};

/// Pin assignment for one motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorPins {
    /// PWM output to the bridge enable input
    pub pwm: Pin,
    /// Bridge input for side A of the motor
    pub power_a: Pin,
    /// Bridge input for side B of the motor
    pub power_b: Pin,
    /// Encoder direction output
    pub direction_sense: Pin,
    /// Encoder pulse output (interrupt source)
    pub speed_sense: Pin,
}

/// Snapshot of a motor's commanded and sensed state.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorStatus {
    /// Last commanded duty cycle (0-100)
    pub duty_percent: f32,
    /// Last commanded or sensed direction
    pub clockwise: bool,
    /// Latest measured speed
    pub rpm: f32,
    /// Output-shaft revolutions counted so far
    pub revolutions: f32,
}

/// Convert a duty percentage to a PWM compare level.
///
/// Rounds to nearest; results outside `0..=full_scale` are clamped.
///
/// # Examples
///
/// ```
/// use rs_drivers::motor::duty_to_level;
///
/// assert_eq!(duty_to_level(50.0, 65535), 32768);
/// assert_eq!(duty_to_level(100.0, 1023), 1023);
/// assert_eq!(duty_to_level(150.0, 1023), 1023);
/// assert_eq!(duty_to_level(-5.0, 1023), 0);
/// ```
pub fn duty_to_level(percent: f32, full_scale: u16) -> u16 {
    let full = full_scale as f32;
    libm::roundf(percent * full / 100.0).clamp(0.0, full) as u16
}

/// Open-loop DC motor driver with encoder feedback.
///
/// # Type Parameters
///
/// - `G`: GPIO platform, also used to subscribe the speed pin interrupt
/// - `P`: PWM platform sharing `G`'s error type
///
/// Direction, speed and revolutions are shared with the interrupt handler
/// through an [`EncoderFeedback`] that lives in an [`EncoderRegistry`].
pub struct MotorController<G, P> {
    gpio: G,
    pwm: P,
    pins: MotorPins,
    duty_percent: f32,
    feedback: &'static EncoderFeedback,
}

impl<G, P, E> MotorController<G, P>
where
    G: Gpio<Error = E> + EdgeInterrupt<Error = E>,
    P: Pwm<Error = E>,
{
    /// Configure the pins and register the encoder in the global [`ENCODERS`].
    ///
    /// Enables the falling-edge interrupt on the speed pin; the platform's
    /// GPIO interrupt handler must forward edges to
    /// [`on_speed_edge`](crate::encoder::on_speed_edge).
    ///
    /// # Errors
    ///
    /// Returns an error if a platform call fails or the speed pin cannot be
    /// registered. Pin and PWM failures happen before registration and leave
    /// the registry untouched. If enabling the interrupt fails the speed pin
    /// stays registered, and a retry on the same pin fails with
    /// [`RegistryError::DuplicatePin`](crate::RegistryError::DuplicatePin).
    pub fn new(
        gpio: G,
        pwm: P,
        pins: MotorPins,
        config: MotorConfig,
    ) -> Result<Self, MotorError<E>> {
        Self::with_registry(gpio, pwm, pins, config, &ENCODERS)
    }

    /// Like [`new`](Self::new) but registers into a caller-provided registry.
    pub fn with_registry<const N: usize>(
        mut gpio: G,
        mut pwm: P,
        pins: MotorPins,
        config: MotorConfig,
        registry: &'static EncoderRegistry<N>,
    ) -> Result<Self, MotorError<E>> {
        let hw = MotorError::Hardware;

        gpio.init_output(pins.power_a).map_err(hw)?;
        gpio.init_output(pins.power_b).map_err(hw)?;
        gpio.init_input(pins.direction_sense, Pull::Up).map_err(hw)?;
        gpio.init_input(pins.speed_sense, Pull::Up).map_err(hw)?;

        pwm.init(pins.pwm, config.pwm_clock_divisor).map_err(hw)?;
        pwm.set_enabled(pins.pwm, true).map_err(hw)?;
        pwm.set_level(pins.pwm, 0).map_err(hw)?;

        // slots are never released; register after the PWM setup
        let feedback = registry
            .register(
                pins.speed_sense,
                pins.direction_sense,
                config.pulses_per_revolution,
            )
            .inspect_err(|err| log::warn!("motor on pwm pin {}: {}", pins.pwm, err))?;

        gpio.enable_edge_interrupt(pins.speed_sense, Edge::Falling)
            .map_err(hw)?;

        log::info!(
            "motor ready: pwm={} power=({}, {}) encoder dir={} speed={} ppr={}",
            pins.pwm,
            pins.power_a,
            pins.power_b,
            pins.direction_sense,
            pins.speed_sense,
            config.pulses_per_revolution
        );

        Ok(Self {
            gpio,
            pwm,
            pins,
            duty_percent: 0.0,
            feedback,
        })
    }

    /// Select rotation direction by driving the bridge inputs.
    ///
    /// Side A is driven high for clockwise, side B for counter-clockwise.
    /// Depending on how the motor is wired the sense may be inverted.
    pub fn set_direction(&mut self, clockwise: bool) -> Result<(), E> {
        self.gpio.write(self.pins.power_a, clockwise)?;
        self.gpio.write(self.pins.power_b, !clockwise)?;
        self.feedback.set_clockwise(clockwise);
        Ok(())
    }

    /// Set the PWM duty cycle in percent (0-100, fractions allowed).
    ///
    /// Re-enables the PWM counter. The value is stored as given; only the
    /// compare level written to the hardware is clamped.
    pub fn set_duty_percent(&mut self, percent: f32) -> Result<(), E> {
        self.duty_percent = percent;

        let level = duty_to_level(percent, self.pwm.full_scale());
        self.pwm.set_enabled(self.pins.pwm, true)?;
        self.pwm.set_level(self.pins.pwm, level)
    }

    /// Release both bridge inputs.
    ///
    /// The PWM duty is left untouched, so a later
    /// [`set_direction`](Self::set_direction) resumes at the previous duty.
    pub fn stop(&mut self) -> Result<(), E> {
        self.gpio.write(self.pins.power_a, false)?;
        self.gpio.write(self.pins.power_b, false)
    }
}

impl<G, P> MotorController<G, P> {
    /// Last commanded duty cycle.
    #[inline]
    pub fn duty_percent(&self) -> f32 {
        self.duty_percent
    }

    /// Direction flag, updated by commands and by the encoder.
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.feedback.is_clockwise()
    }

    /// Latest measured speed in RPM.
    #[inline]
    pub fn rpm(&self) -> f32 {
        self.feedback.rpm()
    }

    /// Output-shaft revolutions counted since construction.
    #[inline]
    pub fn revolutions(&self) -> f32 {
        self.feedback.revolutions()
    }

    /// Snapshot of commanded and sensed state.
    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            duty_percent: self.duty_percent,
            clockwise: self.is_clockwise(),
            rpm: self.rpm(),
            revolutions: self.revolutions(),
        }
    }

    /// Encoder direction input pin.
    #[inline]
    pub fn direction_pin(&self) -> Pin {
        self.pins.direction_sense
    }

    /// Pin assignment.
    #[inline]
    pub fn pins(&self) -> &MotorPins {
        &self.pins
    }

    /// Shared feedback cell written by the interrupt handler.
    #[inline]
    pub fn feedback(&self) -> &'static EncoderFeedback {
        self.feedback
    }

    /// Borrow the GPIO platform.
    #[inline]
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Mutably borrow the GPIO platform.
    #[inline]
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// Borrow the PWM platform.
    #[inline]
    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
