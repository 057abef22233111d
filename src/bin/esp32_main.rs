//! ESP32-C3 SuperMini motor and shift register bring-up.
//!
//! Runs a 10Hz loop that:
//! - Ramps the motor duty cycle up and down, reversing at zero
//! - Logs the encoder-derived RPM and revolution count
//! - Shows a running counter on the 74HC595 outputs
//!
//! # Wiring
//!
//! See [`rs_drivers::hal::esp32::pins`] for the GPIO numbers.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use rs_drivers::hal::esp32::{pins, Esp32Delay, Esp32Gpio, Esp32Pwm};
use rs_drivers::{
    MotorConfig, MotorController, MotorPins, ShiftRegister, ShiftRegisterConfig,
    ShiftRegisterPins,
};
use std::thread;
use std::time::Duration;

/// Main loop interval in milliseconds (10Hz)
const LOOP_INTERVAL_MS: u64 = 100;

/// Duty change per loop tick
const DUTY_STEP: f32 = 2.0;

/// Upper end of the duty ramp
const DUTY_MAX: f32 = 80.0;

/// Status log interval in loop ticks (every 10 ticks = 1s)
const LOG_INTERVAL: u32 = 10;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("rs-drivers SuperMini bring-up");

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Motor (L298N on GPIO2-4, encoder on GPIO5/6)
    // =========================================================================
    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(20.kHz().into())
            .resolution(Resolution::Bits10),
    )?;
    let channel = LedcDriver::new(peripherals.ledc.channel0, &timer, peripherals.pins.gpio2)?;
    let pwm = Esp32Pwm::new(pins::MOTOR_PWM, channel);

    let mut motor = MotorController::new(
        Esp32Gpio::new(),
        pwm,
        MotorPins {
            pwm: pins::MOTOR_PWM,
            power_a: pins::MOTOR_POWER_A,
            power_b: pins::MOTOR_POWER_B,
            direction_sense: pins::MOTOR_DIR,
            speed_sense: pins::MOTOR_SPEED,
        },
        MotorConfig::default(),
    )?;

    // =========================================================================
    // Initialize Shift Register (74HC595 on GPIO7-10)
    // =========================================================================
    let mut leds = ShiftRegister::new(
        Esp32Gpio::new(),
        Esp32Delay::new(),
        ShiftRegisterPins::new(pins::SR_DATA, pins::SR_SHIFT, pins::SR_STORE)
            .with_reclear(pins::SR_RECLEAR),
        ShiftRegisterConfig::default().with_init_cleared(true),
    )?;

    log::info!("starting loop ({}ms)", LOOP_INTERVAL_MS);

    // =========================================================================
    // Main Loop
    // =========================================================================
    let mut duty = 0.0_f32;
    let mut rising = true;
    let mut clockwise = true;
    let mut tick: u32 = 0;

    motor.set_direction(clockwise)?;

    loop {
        // ---------------------------------------------------------------------
        // Duty ramp, reversing each time it returns to zero
        // ---------------------------------------------------------------------
        if rising {
            duty += DUTY_STEP;
            if duty >= DUTY_MAX {
                rising = false;
            }
        } else {
            duty -= DUTY_STEP;
            if duty <= 0.0 {
                duty = 0.0;
                rising = true;
                clockwise = !clockwise;
                motor.stop()?;
                motor.set_direction(clockwise)?;
            }
        }
        motor.set_duty_percent(duty)?;

        // ---------------------------------------------------------------------
        // Counter on the shift register outputs
        // ---------------------------------------------------------------------
        leds.write(tick as u8)?;

        if tick % LOG_INTERVAL == 0 {
            let status = motor.status();
            log::info!(
                "duty {:.0}% {} rpm {:.1} revs {:.2}",
                status.duty_percent,
                if status.clockwise { "cw" } else { "ccw" },
                status.rpm,
                status.revolutions
            );
        }

        tick = tick.wrapping_add(1);
        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
