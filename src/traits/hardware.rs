//! Platform abstraction traits for GPIO, PWM, edge interrupts and timing.
//!
//! The drivers in this crate never touch registers directly. Everything
//! they need from the board is expressed through the traits below, which
//! address pins by their numeric identifier the way most vendor SDKs do.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Gpio`] | Digital pin direction, pulls, reads and writes |
//! | [`EdgeInterrupt`] | Subscribe a pin to the shared edge interrupt |
//! | [`Pwm`] | Duty-cycle output on a PWM-capable pin |
//! | [`MicrosClock`] | Free-running 32-bit microsecond counter |
//! | [`DelayUs`] | Busy-wait delays for pulse timing |
//!
//! # Implementation
//!
//! For testing and desktop development, use the recording mocks from
//! [`crate::hal::mock`]. For ESP32 hardware, use the implementations from
//! `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::traits::{Gpio, Pull};
//! use rs_drivers::hal::MockGpio;
//!
//! let mut gpio = MockGpio::new();
//! gpio.init_output(4).unwrap();
//! gpio.write(4, true).unwrap();
//! assert!(gpio.is_high(4));
//!
//! gpio.init_input(5, Pull::Up).unwrap();
//! assert!(gpio.is_high(5)); // pulled up, nothing driving it
//! ```

/// Numeric pin identifier as understood by the platform.
pub type Pin = u32;

/// Internal pull resistor selection for input pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pull {
    /// Floating input.
    #[default]
    None,
    /// Internal pull-up enabled.
    Up,
    /// Internal pull-down enabled.
    Down,
}

/// Signal edge that triggers an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// High to low transition.
    Falling,
    /// Low to high transition.
    Rising,
}

/// Digital I/O on numbered pins.
///
/// Configuration and writes may fail on real hardware; reads are treated
/// as infallible so they can be used from interrupt context.
pub trait Gpio {
    /// Error type for pin operations.
    type Error;

    /// Reset the pin and configure it as a push-pull output.
    ///
    /// The pin starts driven low, which is what most SDKs do after init.
    fn init_output(&mut self, pin: Pin) -> Result<(), Self::Error>;

    /// Reset the pin and configure it as an input with the given pull.
    fn init_input(&mut self, pin: Pin, pull: Pull) -> Result<(), Self::Error>;

    /// Drive an output pin high (`true`) or low (`false`).
    fn write(&mut self, pin: Pin, high: bool) -> Result<(), Self::Error>;

    /// Read the current logic level of a pin.
    fn is_high(&self, pin: Pin) -> bool;

    /// Convenience inverse of [`is_high`](Self::is_high).
    fn is_low(&self, pin: Pin) -> bool {
        !self.is_high(pin)
    }
}

/// Routing of pin edges to the shared GPIO interrupt.
///
/// Platforms have a single GPIO interrupt vector; the handler installed
/// behind it must call [`crate::encoder::on_speed_edge`] (or dispatch to
/// an [`EncoderRegistry`](crate::encoder::EncoderRegistry) directly).
pub trait EdgeInterrupt {
    /// Error type for interrupt configuration.
    type Error;

    /// Enable the edge interrupt for `pin`.
    fn enable_edge_interrupt(&mut self, pin: Pin, edge: Edge) -> Result<(), Self::Error>;
}

/// PWM output addressed by the pin it is routed to.
pub trait Pwm {
    /// Error type for PWM operations.
    type Error;

    /// Counter value that corresponds to 100% duty.
    fn full_scale(&self) -> u16;

    /// Route `pin` to its PWM channel and apply the clock divisor.
    fn init(&mut self, pin: Pin, clock_divisor: f32) -> Result<(), Self::Error>;

    /// Start or stop the counter driving `pin`.
    fn set_enabled(&mut self, pin: Pin, enabled: bool) -> Result<(), Self::Error>;

    /// Set the compare level for `pin` (0 ..= [`full_scale`](Self::full_scale)).
    fn set_level(&mut self, pin: Pin, level: u16) -> Result<(), Self::Error>;
}

/// Free-running microsecond counter.
///
/// Wraps at 2^32 (roughly every 71.6 minutes).
pub trait MicrosClock {
    /// Current counter value in microseconds.
    fn now_us(&self) -> u32;
}

/// Blocking delay used for pulse widths and settle times.
pub trait DelayUs {
    /// Busy-wait for `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Busy-wait for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

impl<T: MicrosClock + ?Sized> MicrosClock for &T {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}
