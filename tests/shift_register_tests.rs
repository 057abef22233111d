//! Integration tests for the 74HC595 shift register driver

use rs_drivers::{
    hal::{MockDelay, MockGpio, PinEvent},
    Gpio, ShiftRegister, ShiftRegisterConfig, ShiftRegisterPins, BIT_SETTLE_US,
    MIN_PULSE_WIDTH_US,
};

const DATA: u32 = 7;
const SHIFT: u32 = 8;
const STORE: u32 = 9;
const RECLEAR: u32 = 10;
const ENABLE: u32 = 11;

fn register(
    pins: ShiftRegisterPins,
    config: ShiftRegisterConfig,
) -> ShiftRegister<MockGpio, MockDelay> {
    let gpio = MockGpio::new();
    let delay = gpio.delay();
    let register = ShiftRegister::new(gpio, delay, pins, config).unwrap();
    register.gpio().clear_events();
    register
}

fn basic_pins() -> ShiftRegisterPins {
    ShiftRegisterPins::new(DATA, SHIFT, STORE)
}

fn manual_store() -> ShiftRegisterConfig {
    ShiftRegisterConfig::default().with_auto_store(false)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn construction_configures_outputs() {
    let gpio = MockGpio::new();
    let delay = gpio.delay();
    let register = ShiftRegister::new(
        gpio,
        delay,
        basic_pins().with_reclear(RECLEAR).with_enable(ENABLE),
        ShiftRegisterConfig::default(),
    )
    .unwrap();

    assert_eq!(
        register.gpio().events(),
        vec![
            PinEvent::InitOutput(DATA),
            PinEvent::InitOutput(SHIFT),
            PinEvent::InitOutput(STORE),
            PinEvent::InitOutput(RECLEAR),
            PinEvent::Write(RECLEAR, true),
            PinEvent::InitOutput(ENABLE),
        ]
    );
    // outputs enabled (OE low) after init
    assert!(!register.gpio().is_high(ENABLE));
}

#[test]
fn init_cleared_without_reclear_shifts_zeros() {
    let gpio = MockGpio::new();
    let delay = gpio.delay();
    let register = ShiftRegister::new(
        gpio,
        delay,
        basic_pins(),
        ShiftRegisterConfig::default().with_init_cleared(true),
    )
    .unwrap();

    let gpio = register.gpio();
    assert_eq!(gpio.shifted_bits(DATA, SHIFT), vec![false; 8]);
    assert_eq!(gpio.pulses(STORE), 1);
}

#[test]
fn init_cleared_latches_even_without_autostore() {
    let gpio = MockGpio::new();
    let delay = gpio.delay();
    let register = ShiftRegister::new(
        gpio,
        delay,
        basic_pins().with_reclear(RECLEAR),
        manual_store().with_init_cleared(true),
    )
    .unwrap();

    let gpio = register.gpio();
    assert_eq!(gpio.writes_to(RECLEAR), vec![true, false, true]);
    assert_eq!(gpio.pulses(STORE), 1);
    assert_eq!(gpio.pulses(SHIFT), 0);
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn byte_is_shifted_msb_first() {
    let mut register = register(basic_pins(), manual_store());

    register.write(0xA5).unwrap();
    register.store().unwrap();

    let bits = register.gpio().shifted_bits(DATA, SHIFT);
    assert_eq!(
        bits,
        vec![true, false, true, false, false, true, false, true]
    );
    assert_eq!(register.gpio().pulses(STORE), 1);
}

#[test]
fn each_bit_sets_data_before_clocking() {
    let mut register = register(basic_pins(), manual_store());

    register.write(0b1000_0000).unwrap();

    let events = register.gpio().events();
    assert_eq!(events[0], PinEvent::Write(STORE, false));
    assert_eq!(
        &events[1..6],
        &[
            PinEvent::Write(DATA, true),
            PinEvent::Write(SHIFT, true),
            PinEvent::Delay(MIN_PULSE_WIDTH_US),
            PinEvent::Write(SHIFT, false),
            PinEvent::Delay(BIT_SETTLE_US),
        ]
    );
    assert_eq!(events[6], PinEvent::Write(DATA, false));
}

#[test]
fn write_bit_leaves_storage_alone() {
    let mut register = register(basic_pins(), ShiftRegisterConfig::default());

    register.write_bit(true).unwrap();

    let gpio = register.gpio();
    assert_eq!(gpio.shifted_bits(DATA, SHIFT), vec![true]);
    assert!(gpio.writes_to(STORE).is_empty());
}

#[test]
fn autostore_latches_after_write() {
    let mut register = register(basic_pins(), ShiftRegisterConfig::default());

    register.write(0x0F).unwrap();

    let gpio = register.gpio();
    assert_eq!(gpio.pulses(SHIFT), 8);
    assert_eq!(gpio.pulses(STORE), 1);
    assert_eq!(
        gpio.writes().last(),
        Some(&(STORE, false)),
        "store pulse must come after the last bit"
    );
}

#[test]
fn manual_store_does_not_latch() {
    let mut register = register(basic_pins(), manual_store());

    register.write(0xFF).unwrap();

    assert_eq!(register.gpio().pulses(STORE), 0);
}

#[test]
fn autostore_can_be_toggled() {
    let mut register = register(basic_pins(), ShiftRegisterConfig::default());
    assert!(register.auto_store());

    register.set_auto_store(false);
    register.write(0x01).unwrap();
    assert_eq!(register.gpio().pulses(STORE), 0);

    register.set_auto_store(true);
    register.write(0x02).unwrap();
    assert_eq!(register.gpio().pulses(STORE), 1);
}

#[test]
fn write_bytes_latches_once() {
    let mut register = register(basic_pins(), ShiftRegisterConfig::default());

    register.write_bytes(&[0xF0, 0x0F]).unwrap();

    let gpio = register.gpio();
    let mut expected = vec![true; 4];
    expected.extend([false; 8]);
    expected.extend([true; 4]);
    assert_eq!(gpio.shifted_bits(DATA, SHIFT), expected);
    assert_eq!(gpio.pulses(STORE), 1);
}

#[test]
fn delays_use_configured_timings() {
    let gpio = MockGpio::new();
    let delay = gpio.delay();
    let mut register = ShiftRegister::new(
        gpio,
        delay,
        basic_pins(),
        ShiftRegisterConfig::default()
            .with_pulse_width_us(2)
            .with_bit_settle_us(3),
    )
    .unwrap();

    register.write(0x00).unwrap();

    // 8 x (pulse + settle) + store pulse
    let (_, delay) = register.into_inner();
    assert_eq!(delay.total_us, 8 * (2 + 3) + 2);
    assert_eq!(delay.calls, 17);
}

// ============================================================================
// Clear
// ============================================================================

#[test]
fn clear_without_reclear_matches_write_zero() {
    let mut cleared = register(basic_pins(), ShiftRegisterConfig::default());
    let mut written = register(basic_pins(), ShiftRegisterConfig::default());

    cleared.clear().unwrap();
    written.write(0).unwrap();

    assert_eq!(cleared.gpio().events(), written.gpio().events());
}

#[test]
fn clear_with_reclear_respects_manual_store() {
    let mut register = register(basic_pins().with_reclear(RECLEAR), manual_store());

    register.clear().unwrap();

    let gpio = register.gpio();
    assert_eq!(gpio.writes_to(RECLEAR), vec![false, true]);
    assert!(gpio.writes_to(STORE).is_empty());
    assert!(gpio.writes_to(SHIFT).is_empty());
    assert!(gpio.is_high(RECLEAR));
}

#[test]
fn clear_with_reclear_latches_on_autostore() {
    let mut register = register(
        basic_pins().with_reclear(RECLEAR),
        ShiftRegisterConfig::default(),
    );

    register.clear().unwrap();

    assert_eq!(
        register.gpio().events(),
        vec![
            PinEvent::Write(RECLEAR, false),
            PinEvent::Delay(MIN_PULSE_WIDTH_US),
            PinEvent::Write(RECLEAR, true),
            PinEvent::Write(STORE, true),
            PinEvent::Delay(MIN_PULSE_WIDTH_US),
            PinEvent::Write(STORE, false),
        ]
    );
}

// ============================================================================
// Output enable
// ============================================================================

#[test]
fn set_enabled_without_pin_is_noop() {
    let mut register = register(basic_pins(), ShiftRegisterConfig::default());

    register.set_enabled(true).unwrap();
    register.set_enabled(false).unwrap();

    assert!(register.gpio().events().is_empty());
}

#[test]
fn enable_pin_is_active_low() {
    let mut register = register(
        basic_pins().with_enable(ENABLE),
        ShiftRegisterConfig::default(),
    );

    register.set_enabled(true).unwrap();
    assert_eq!(register.gpio().writes(), vec![(ENABLE, false)]);

    register.set_enabled(false).unwrap();
    assert_eq!(
        register.gpio().writes(),
        vec![(ENABLE, false), (ENABLE, true)]
    );
}
