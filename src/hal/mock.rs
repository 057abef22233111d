//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all platform traits, enabling
//! development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockGpio`] | [`Gpio`], [`EdgeInterrupt`] | Records pin configuration and writes |
//! | [`MockDelay`] | [`DelayUs`] | Records delays, optionally on a GPIO timeline |
//! | [`MockPwm`] | [`Pwm`] | Tracks per-pin PWM channel state |
//! | [`MockClock`] | [`MicrosClock`] | Controllable, wrapping microsecond counter |
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::hal::{MockGpio, PinEvent};
//! use rs_drivers::traits::{DelayUs, Gpio};
//!
//! let mut gpio = MockGpio::new();
//! let mut delay = gpio.delay(); // shares the event timeline
//!
//! gpio.write(3, true).unwrap();
//! delay.delay_us(10);
//! gpio.write(3, false).unwrap();
//!
//! assert_eq!(
//!     gpio.events(),
//!     vec![
//!         PinEvent::Write(3, true),
//!         PinEvent::Delay(10),
//!         PinEvent::Write(3, false),
//!     ]
//! );
//! assert_eq!(gpio.pulses(3), 1);
//! ```

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::traits::{DelayUs, Edge, EdgeInterrupt, Gpio, MicrosClock, Pin, Pull, Pwm};

/// Shared, ordered log of everything the mocks observed.
pub type Timeline = Rc<RefCell<Vec<PinEvent>>>;

/// One observed platform call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinEvent {
    /// `init_output(pin)`
    InitOutput(Pin),
    /// `init_input(pin, pull)`
    InitInput(Pin, Pull),
    /// `write(pin, high)`
    Write(Pin, bool),
    /// `enable_edge_interrupt(pin, edge)`
    EnableInterrupt(Pin, Edge),
    /// `delay_us(us)` from a [`MockDelay`] attached to the timeline
    Delay(u32),
}

// ============================================================================
// GPIO
// ============================================================================

/// Mock GPIO for testing.
///
/// Records every configuration call and write on a [`Timeline`] and keeps
/// the current level of each pin. Inputs can be driven from the test with
/// [`set_input`](Self::set_input).
///
/// # Example
///
/// ```rust
/// use rs_drivers::hal::MockGpio;
/// use rs_drivers::traits::{Gpio, Pull};
///
/// let mut gpio = MockGpio::new();
/// gpio.init_input(7, Pull::Up).unwrap();
/// assert!(gpio.is_high(7));
///
/// gpio.set_input(7, false); // something pulls it low
/// assert!(gpio.is_low(7));
/// ```
#[derive(Debug, Default)]
pub struct MockGpio {
    timeline: Timeline,
    levels: BTreeMap<Pin, bool>,
}

impl MockGpio {
    /// Creates a new mock with an empty timeline and every pin low.
    pub fn new() -> Self {
        Self::default()
    }

    /// A delay that records onto this GPIO's timeline.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            timeline: Some(self.timeline.clone()),
            ..MockDelay::default()
        }
    }

    /// Drive an input level from outside.
    pub fn set_input(&mut self, pin: Pin, high: bool) {
        self.levels.insert(pin, high);
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<PinEvent> {
        self.timeline.borrow().clone()
    }

    /// Forget all recorded events (pin levels are kept).
    pub fn clear_events(&self) {
        self.timeline.borrow_mut().clear();
    }

    /// Every `write` in order, as `(pin, high)`.
    pub fn writes(&self) -> Vec<(Pin, bool)> {
        self.timeline
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                PinEvent::Write(pin, high) => Some((pin, high)),
                _ => None,
            })
            .collect()
    }

    /// Levels written to one pin, in order.
    pub fn writes_to(&self, pin: Pin) -> Vec<bool> {
        self.writes()
            .into_iter()
            .filter(|&(p, _)| p == pin)
            .map(|(_, high)| high)
            .collect()
    }

    /// Number of low-to-high transitions written to `pin`.
    ///
    /// The pin is assumed low before the first recorded write.
    pub fn pulses(&self, pin: Pin) -> usize {
        let mut level = false;
        let mut rising = 0;
        for high in self.writes_to(pin) {
            if high && !level {
                rising += 1;
            }
            level = high;
        }
        rising
    }

    /// Data levels sampled on each rising edge of `clock`.
    ///
    /// This is what a shift register clocked by `clock` would have read.
    pub fn shifted_bits(&self, data: Pin, clock: Pin) -> Vec<bool> {
        let mut data_level = false;
        let mut clock_level = false;
        let mut bits = Vec::new();
        for (pin, high) in self.writes() {
            if pin == data {
                data_level = high;
            } else if pin == clock {
                if high && !clock_level {
                    bits.push(data_level);
                }
                clock_level = high;
            }
        }
        bits
    }

    fn record(&self, event: PinEvent) {
        self.timeline.borrow_mut().push(event);
    }
}

impl Gpio for MockGpio {
    type Error = ();

    fn init_output(&mut self, pin: Pin) -> Result<(), ()> {
        self.levels.insert(pin, false);
        self.record(PinEvent::InitOutput(pin));
        Ok(())
    }

    fn init_input(&mut self, pin: Pin, pull: Pull) -> Result<(), ()> {
        match pull {
            Pull::Up => {
                self.levels.insert(pin, true);
            }
            Pull::Down => {
                self.levels.insert(pin, false);
            }
            Pull::None => {}
        }
        self.record(PinEvent::InitInput(pin, pull));
        Ok(())
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<(), ()> {
        self.levels.insert(pin, high);
        self.record(PinEvent::Write(pin, high));
        Ok(())
    }

    fn is_high(&self, pin: Pin) -> bool {
        self.levels.get(&pin).copied().unwrap_or(false)
    }
}

impl EdgeInterrupt for MockGpio {
    type Error = ();

    fn enable_edge_interrupt(&mut self, pin: Pin, edge: Edge) -> Result<(), ()> {
        self.record(PinEvent::EnableInterrupt(pin, edge));
        Ok(())
    }
}

// ============================================================================
// Delay
// ============================================================================

/// Mock delay for testing.
///
/// Returns immediately, accumulating the requested time. When created
/// through [`MockGpio::delay`] each delay is also recorded on the GPIO
/// timeline so pulse widths can be checked in order.
#[derive(Debug, Default)]
pub struct MockDelay {
    timeline: Option<Timeline>,
    /// Total requested delay in microseconds.
    pub total_us: u64,
    /// Number of `delay_us` calls.
    pub calls: usize,
}

impl MockDelay {
    /// Creates a standalone mock delay.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelayUs for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.total_us += us as u64;
        self.calls += 1;
        if let Some(timeline) = &self.timeline {
            timeline.borrow_mut().push(PinEvent::Delay(us));
        }
    }
}

// ============================================================================
// PWM
// ============================================================================

/// State of one mock PWM channel.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MockPwmChannel {
    /// Divisor passed to `init`
    pub clock_divisor: f32,
    /// Whether the counter is running
    pub enabled: bool,
    /// Current compare level
    pub level: u16,
}

/// Mock PWM for testing.
///
/// # Example
///
/// ```rust
/// use rs_drivers::hal::MockPwm;
/// use rs_drivers::traits::Pwm;
///
/// let mut pwm = MockPwm::new().with_full_scale(1023);
/// pwm.init(2, 12.0).unwrap();
/// pwm.set_level(2, 512).unwrap();
///
/// assert_eq!(pwm.full_scale(), 1023);
/// assert_eq!(pwm.channel(2).unwrap().level, 512);
/// assert_eq!(pwm.history, vec![(2, 512)]);
/// ```
#[derive(Debug)]
pub struct MockPwm {
    /// Counter value reported as 100% duty.
    pub full_scale: u16,
    /// Channel state by pin.
    pub channels: BTreeMap<Pin, MockPwmChannel>,
    /// Every level written, as `(pin, level)`.
    pub history: Vec<(Pin, u16)>,
    /// When set, `init` fails without touching any channel.
    pub fail_init: bool,
}

impl MockPwm {
    /// Creates a 16-bit mock PWM.
    pub fn new() -> Self {
        Self {
            full_scale: u16::MAX,
            channels: BTreeMap::new(),
            history: Vec::new(),
            fail_init: false,
        }
    }

    /// Use a different counter resolution.
    pub fn with_full_scale(mut self, full_scale: u16) -> Self {
        self.full_scale = full_scale;
        self
    }

    /// Make every `init` call fail.
    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// State of the channel on `pin`, if it was touched.
    pub fn channel(&self, pin: Pin) -> Option<&MockPwmChannel> {
        self.channels.get(&pin)
    }
}

impl Default for MockPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl Pwm for MockPwm {
    type Error = ();

    fn full_scale(&self) -> u16 {
        self.full_scale
    }

    fn init(&mut self, pin: Pin, clock_divisor: f32) -> Result<(), ()> {
        if self.fail_init {
            return Err(());
        }
        self.channels.insert(
            pin,
            MockPwmChannel {
                clock_divisor,
                ..MockPwmChannel::default()
            },
        );
        Ok(())
    }

    fn set_enabled(&mut self, pin: Pin, enabled: bool) -> Result<(), ()> {
        self.channels.entry(pin).or_default().enabled = enabled;
        Ok(())
    }

    fn set_level(&mut self, pin: Pin, level: u16) -> Result<(), ()> {
        self.channels.entry(pin).or_default().level = level;
        self.history.push((pin, level));
        Ok(())
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Mock clock for testing.
///
/// Provides a controllable microsecond counter that wraps like the
/// hardware one.
///
/// # Example
///
/// ```rust
/// use rs_drivers::hal::MockClock;
/// use rs_drivers::traits::MicrosClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_us(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_us(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_us(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_us: u32,
}

impl MockClock {
    /// Creates a new mock clock starting at 0us.
    pub fn new() -> Self {
        Self { current_us: 0 }
    }

    /// Sets the current time in microseconds.
    pub fn set(&mut self, us: u32) {
        self.current_us = us;
    }

    /// Advances the clock, wrapping at 2^32.
    pub fn advance(&mut self, us: u32) {
        self.current_us = self.current_us.wrapping_add(us);
    }
}

impl MicrosClock for MockClock {
    fn now_us(&self) -> u32 {
        self.current_us
    }
}

// ============================================================================
// Tests
// ============================================================================
