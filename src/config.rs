//! Driver configuration for motors and shift registers.
//!
//! Device constants (encoder resolution, PWM divisor, pulse timings) live
//! here instead of being scattered through the drivers as magic numbers.
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::config::{MotorConfig, ShiftRegisterConfig};
//!
//! // Use defaults (MG310P20 gear motor, 74HC595)
//! let motor = MotorConfig::default();
//! assert!((motor.pulses_per_revolution - 285.6).abs() < 1e-3);
//!
//! // Or customize
//! let motor = MotorConfig::default().with_pulses_per_revolution(11.0 * 30.0);
//! let register = ShiftRegisterConfig::default()
//!     .with_auto_store(false)
//!     .with_init_cleared(true);
//! ```

/// Minimum high/low pulse width used for the shift, store and clear lines.
pub const MIN_PULSE_WIDTH_US: u32 = 10;

/// Time the data line is given to settle between consecutive bits.
pub const BIT_SETTLE_US: u32 = 10;

/// Gear reduction of the MG310P20 gear motor.
pub const DEFAULT_GEAR_RATIO: f32 = 20.4;

/// Hall encoder pulses per motor-shaft revolution on the MG310P20.
pub const DEFAULT_PULSES_PER_MOTOR_REV: f32 = 14.0;

/// Clock divisor applied to the PWM counter.
pub const DEFAULT_PWM_CLOCK_DIVISOR: f32 = 12.0;

// ============================================================================
// Motor Config
// ============================================================================

/// Configuration for a [`MotorController`](crate::MotorController).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorConfig {
    /// Divisor applied to the PWM peripheral clock
    pub pwm_clock_divisor: f32,
    /// Encoder pulses per revolution of the output shaft
    pub pulses_per_revolution: f32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pwm_clock_divisor: DEFAULT_PWM_CLOCK_DIVISOR,
            pulses_per_revolution: DEFAULT_GEAR_RATIO * DEFAULT_PULSES_PER_MOTOR_REV,
        }
    }
}

impl MotorConfig {
    /// Set the PWM clock divisor
    pub fn with_pwm_clock_divisor(mut self, divisor: f32) -> Self {
        self.pwm_clock_divisor = divisor;
        self
    }

    /// Set the encoder pulses per output-shaft revolution
    pub fn with_pulses_per_revolution(mut self, pulses: f32) -> Self {
        self.pulses_per_revolution = pulses;
        self
    }

    /// Derive pulses per revolution from a gear ratio and the encoder's
    /// pulses per motor-shaft revolution.
    pub fn with_gearing(mut self, gear_ratio: f32, pulses_per_motor_rev: f32) -> Self {
        self.pulses_per_revolution = gear_ratio * pulses_per_motor_rev;
        self
    }
}

// ============================================================================
// Shift Register Config
// ============================================================================

/// Configuration for a [`ShiftRegister`](crate::ShiftRegister).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftRegisterConfig {
    /// Latch into the output register after every write and clear
    pub auto_store: bool,
    /// Clear both registers during construction
    pub init_cleared: bool,
    /// High time of shift/store pulses and low time of the clear pulse
    pub pulse_width_us: u32,
    /// Delay between consecutive bits of a byte
    pub bit_settle_us: u32,
}

impl Default for ShiftRegisterConfig {
    fn default() -> Self {
        Self {
            auto_store: true,
            init_cleared: false,
            pulse_width_us: MIN_PULSE_WIDTH_US,
            bit_settle_us: BIT_SETTLE_US,
        }
    }
}

impl ShiftRegisterConfig {
    /// Enable or disable autostore
    pub fn with_auto_store(mut self, auto_store: bool) -> Self {
        self.auto_store = auto_store;
        self
    }

    /// Clear the register during construction
    pub fn with_init_cleared(mut self, init_cleared: bool) -> Self {
        self.init_cleared = init_cleared;
        self
    }

    /// Set the pulse width used for the clock and clear lines
    pub fn with_pulse_width_us(mut self, us: u32) -> Self {
        self.pulse_width_us = us;
        self
    }

    /// Set the delay between bits
    pub fn with_bit_settle_us(mut self, us: u32) -> Self {
        self.bit_settle_us = us;
        self
    }
}
