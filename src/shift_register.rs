//! Bit-banged driver for 74HC595-style serial-in/parallel-out shift registers.
//!
//! The chip has two stages: an 8-bit shift register clocked in serially,
//! and a storage (output) register that only changes on a rising edge of
//! the store clock. Writing therefore has two halves, shifting bits in and
//! latching them out, which [`ShiftRegister`] can do separately or
//! together (autostore).
//!
//! # Wiring
//!
//! | Pin | Chip | Required |
//! |-----|------|----------|
//! | data | DS / SER | yes |
//! | shift clock | SH_CP / SRCLK | yes |
//! | store clock | ST_CP / RCLK | yes |
//! | reclear | MR / SRCLR (active low) | no |
//! | enable | OE (active low) | no |
//!
//! Most SDKs bring pins up driven low. An unconnected reclear pin would
//! hold MR asserted, so it is driven high during construction. The enable
//! pin is left low, which means the outputs come up enabled.
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::{ShiftRegister, ShiftRegisterConfig, ShiftRegisterPins};
//! use rs_drivers::hal::{MockDelay, MockGpio};
//!
//! let pins = ShiftRegisterPins::new(10, 11, 12).with_reclear(13);
//! let mut register = ShiftRegister::new(
//!     MockGpio::new(),
//!     MockDelay::new(),
//!     pins,
//!     ShiftRegisterConfig::default(),
//! )
//! .unwrap();
//!
//! register.write(0xA5).unwrap(); // shifted and latched
//! register.clear().unwrap();     // MR pulse, then latched
//! ```

use crate::config::ShiftRegisterConfig;
use crate::traits::{DelayUs, Gpio, Pin};

/// Pin assignment for one shift register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftRegisterPins {
    /// Serial data input
    pub data: Pin,
    /// Shift register clock
    pub shift_clock: Pin,
    /// Storage register clock
    pub store_clock: Pin,
    /// Master reclear, active low
    pub reclear: Option<Pin>,
    /// Output enable, active low
    pub enable: Option<Pin>,
}

impl ShiftRegisterPins {
    /// Mandatory pins only.
    pub fn new(data: Pin, shift_clock: Pin, store_clock: Pin) -> Self {
        Self {
            data,
            shift_clock,
            store_clock,
            reclear: None,
            enable: None,
        }
    }

    /// Wire the master reclear pin
    pub fn with_reclear(mut self, pin: Pin) -> Self {
        self.reclear = Some(pin);
        self
    }

    /// Wire the output enable pin
    pub fn with_enable(mut self, pin: Pin) -> Self {
        self.enable = Some(pin);
        self
    }
}

/// 74HC595 driver.
///
/// All operations busy-wait on `D` for the configured pulse widths; never
/// call them from interrupt context.
pub struct ShiftRegister<G, D> {
    gpio: G,
    delay: D,
    pins: ShiftRegisterPins,
    auto_store: bool,
    pulse_width_us: u32,
    bit_settle_us: u32,
}

impl<G: Gpio, D: DelayUs> ShiftRegister<G, D> {
    /// Configure the pins and optionally clear the chip.
    ///
    /// With `init_cleared`, both the shift and storage registers end up
    /// zeroed regardless of `auto_store`.
    pub fn new(
        mut gpio: G,
        delay: D,
        pins: ShiftRegisterPins,
        config: ShiftRegisterConfig,
    ) -> Result<Self, G::Error> {
        gpio.init_output(pins.data)?;
        gpio.init_output(pins.shift_clock)?;
        gpio.init_output(pins.store_clock)?;

        if let Some(reclear) = pins.reclear {
            gpio.init_output(reclear)?;
            // release MR so shifting works
            gpio.write(reclear, true)?;
        }
        if let Some(enable) = pins.enable {
            gpio.init_output(enable)?;
        }

        log::debug!(
            "shift register: data={} shift={} store={} reclear={:?} enable={:?} auto_store={}",
            pins.data,
            pins.shift_clock,
            pins.store_clock,
            pins.reclear,
            pins.enable,
            config.auto_store
        );

        let mut register = Self {
            gpio,
            delay,
            pins,
            auto_store: config.auto_store,
            pulse_width_us: config.pulse_width_us,
            bit_settle_us: config.bit_settle_us,
        };

        if config.init_cleared {
            register.clear()?;
            if !register.auto_store {
                register.store()?;
            }
        }

        Ok(register)
    }

    /// Shift a single bit in. Does not touch the storage register.
    pub fn write_bit(&mut self, bit: bool) -> Result<(), G::Error> {
        self.gpio.write(self.pins.data, bit)?;

        self.gpio.write(self.pins.shift_clock, true)?;
        self.delay.delay_us(self.pulse_width_us);
        self.gpio.write(self.pins.shift_clock, false)
    }

    /// Shift a byte in, most significant bit first.
    ///
    /// Latches it to the outputs when autostore is on.
    pub fn write(&mut self, byte: u8) -> Result<(), G::Error> {
        self.gpio.write(self.pins.store_clock, false)?;
        self.shift_byte(byte)?;

        if self.auto_store {
            self.store()?;
        }
        Ok(())
    }

    /// Shift several bytes through a daisy chain, latching once at the end.
    ///
    /// The first byte ends up in the register furthest down the chain.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), G::Error> {
        self.gpio.write(self.pins.store_clock, false)?;
        for &byte in bytes {
            self.shift_byte(byte)?;
        }

        if self.auto_store {
            self.store()?;
        }
        Ok(())
    }

    /// Latch the shift register contents to the output pins.
    pub fn store(&mut self) -> Result<(), G::Error> {
        self.gpio.write(self.pins.store_clock, true)?;
        self.delay.delay_us(self.pulse_width_us);
        self.gpio.write(self.pins.store_clock, false)
    }

    /// Clear the shift register.
    ///
    /// Without a reclear pin this is `write(0)`. With one, MR is pulsed
    /// low; that only clears the shift stage, so the result is latched
    /// separately when autostore is on.
    pub fn clear(&mut self) -> Result<(), G::Error> {
        let Some(reclear) = self.pins.reclear else {
            return self.write(0);
        };

        self.gpio.write(reclear, false)?;
        self.delay.delay_us(self.pulse_width_us);
        self.gpio.write(reclear, true)?;

        if self.auto_store {
            self.store()?;
        }
        Ok(())
    }

    /// Enable or disable the outputs. No-op without an enable pin.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), G::Error> {
        match self.pins.enable {
            // OE is active low
            Some(pin) => self.gpio.write(pin, !enabled),
            None => Ok(()),
        }
    }

    fn shift_byte(&mut self, byte: u8) -> Result<(), G::Error> {
        for i in (0..8).rev() {
            self.write_bit((byte >> i) & 1 == 1)?;
            self.delay.delay_us(self.bit_settle_us);
        }
        Ok(())
    }
}

impl<G, D> ShiftRegister<G, D> {
    /// Whether writes and clears latch automatically.
    #[inline]
    pub fn auto_store(&self) -> bool {
        self.auto_store
    }

    /// Turn autostore on or off.
    #[inline]
    pub fn set_auto_store(&mut self, auto_store: bool) {
        self.auto_store = auto_store;
    }

    /// Pin assignment.
    #[inline]
    pub fn pins(&self) -> &ShiftRegisterPins {
        &self.pins
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

    /// Borrow the delay provider.
    #[inline]
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Release the platform handles.
    pub fn into_inner(self) -> (G, D) {
        (self.gpio, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockDelay, MockGpio, PinEvent};

    extern crate std;

    const DATA: Pin = 1;
    const SHIFT: Pin = 2;
    const STORE: Pin = 3;
    const RECLEAR: Pin = 4;
    const ENABLE: Pin = 5;

    fn register(
        pins: ShiftRegisterPins,
        config: ShiftRegisterConfig,
    ) -> ShiftRegister<MockGpio, MockDelay> {
        let gpio = MockGpio::new();
        let delay = gpio.delay();
        ShiftRegister::new(gpio, delay, pins, config).unwrap()
    }

    #[test]
    fn pins_builder() {
        let pins = ShiftRegisterPins::new(DATA, SHIFT, STORE)
            .with_reclear(RECLEAR)
            .with_enable(ENABLE);
        assert_eq!(pins.reclear, Some(RECLEAR));
        assert_eq!(pins.enable, Some(ENABLE));
        assert_eq!(ShiftRegisterPins::new(DATA, SHIFT, STORE).reclear, None);
    }

    #[test]
    fn write_bit_pulses_shift_clock() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default(),
        );
        sr.gpio().clear_events();

        sr.write_bit(true).unwrap();

        assert_eq!(
            sr.gpio().events(),
            std::vec![
                PinEvent::Write(DATA, true),
                PinEvent::Write(SHIFT, true),
                PinEvent::Delay(10),
                PinEvent::Write(SHIFT, false),
            ]
        );
    }

    #[test]
    fn store_pulses_store_clock() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default().with_pulse_width_us(3),
        );
        sr.gpio().clear_events();

        sr.store().unwrap();

        assert_eq!(
            sr.gpio().events(),
            std::vec![
                PinEvent::Write(STORE, true),
                PinEvent::Delay(3),
                PinEvent::Write(STORE, false),
            ]
        );
    }

    #[test]
    fn write_lowers_store_clock_first() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default().with_auto_store(false),
        );
        sr.gpio().clear_events();

        sr.write(0xFF).unwrap();

        let events = sr.gpio().events();
        assert_eq!(events[0], PinEvent::Write(STORE, false));
        assert_eq!(sr.gpio().pulses(STORE), 0);
        assert_eq!(sr.gpio().pulses(SHIFT), 8);
    }

    #[test]
    fn write_settles_between_bits() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default()
                .with_auto_store(false)
                .with_pulse_width_us(1)
                .with_bit_settle_us(7),
        );
        sr.gpio().clear_events();

        sr.write(0x00).unwrap();

        let delays: std::vec::Vec<u32> = sr
            .gpio()
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PinEvent::Delay(us) => Some(us),
                _ => None,
            })
            .collect();
        assert_eq!(delays, [1u32, 7].repeat(8));
    }

    #[test]
    fn write_bytes_latches_once() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default(),
        );
        sr.gpio().clear_events();

        sr.write_bytes(&[0x80, 0x01]).unwrap();

        assert_eq!(sr.gpio().pulses(SHIFT), 16);
        assert_eq!(sr.gpio().pulses(STORE), 1);
        assert_eq!(
            sr.gpio().shifted_bits(DATA, SHIFT),
            std::vec![
                true, false, false, false, false, false, false, false, //
                false, false, false, false, false, false, false, true,
            ]
        );
    }

    #[test]
    fn auto_store_can_be_toggled() {
        let mut sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default(),
        );
        assert!(sr.auto_store());

        sr.set_auto_store(false);
        sr.gpio().clear_events();
        sr.write(0x0F).unwrap();

        assert!(!sr.auto_store());
        assert_eq!(sr.gpio().pulses(STORE), 0);
    }

    #[test]
    fn into_inner_returns_handles() {
        let sr = register(
            ShiftRegisterPins::new(DATA, SHIFT, STORE),
            ShiftRegisterConfig::default(),
        );
        let (gpio, delay) = sr.into_inner();
        assert_eq!(gpio.events().len(), 3);
        assert_eq!(delay.total_us, 0);
    }
}
