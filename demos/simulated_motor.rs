//! Desktop simulation of the motor driver and shift register.
//!
//! Drives a [`MotorController`] over the mock HAL, feeds it synthetic
//! encoder edges as if a gear motor were spinning at a fixed speed, and
//! prints what the driver reports. The shift register bar graph tracks
//! the duty cycle.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example simulated_motor
//! ```

use rs_drivers::hal::{MockClock, MockDelay, MockGpio, MockPwm};
use rs_drivers::{
    on_speed_edge, MicrosClock, MotorConfig, MotorController, MotorPins, ShiftRegister,
    ShiftRegisterConfig, ShiftRegisterPins,
};

/// Simulated output shaft speed.
const SHAFT_RPM: f32 = 120.0;

/// Edges fed per duty step.
const EDGES_PER_STEP: u32 = 50;

fn main() -> anyhow::Result<()> {
    println!("=================================");
    println!("  rs-drivers Motor Simulation");
    println!("=================================");
    println!();

    let pins = MotorPins {
        pwm: 2,
        power_a: 3,
        power_b: 4,
        direction_sense: 5,
        speed_sense: 6,
    };
    let config = MotorConfig::default();
    let ppr = config.pulses_per_revolution;

    let mut motor = MotorController::new(MockGpio::new(), MockPwm::new(), pins, config)?;

    let mut leds = ShiftRegister::new(
        MockGpio::new(),
        MockDelay::new(),
        ShiftRegisterPins::new(7, 8, 9).with_reclear(10),
        ShiftRegisterConfig::default().with_init_cleared(true),
    ).map_err(|e| anyhow::anyhow!("{:?}", e))?;

    // Interval between speed edges for the simulated shaft speed
    let edge_interval_us = (60_000_000.0 / (SHAFT_RPM * ppr)) as u32;
    let mut clock = MockClock::new();

    for (step, clockwise) in [(1, true), (2, true), (3, false), (4, false)] {
        let duty = 25.0 * step as f32;
        motor.set_direction(clockwise).map_err(|e| anyhow::anyhow!("{:?}", e))?;
        motor.set_duty_percent(duty).map_err(|e| anyhow::anyhow!("{:?}", e))?;

        // Encoder direction line: low while turning clockwise
        motor.gpio_mut().set_input(pins.direction_sense, !clockwise);

        for _ in 0..EDGES_PER_STEP {
            clock.advance(edge_interval_us);
            on_speed_edge(motor.gpio(), pins.speed_sense, clock.now_us());
        }

        // One LED per 12.5% of duty
        let lit = (duty / 12.5) as u32;
        let bar = if lit >= 8 { 0xFF } else { (1u8 << lit) - 1 };
        leds.write(bar).map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let status = motor.status();
        println!(
            "duty {:>5.1}%  {:<3}  rpm {:>7.2}  revs {:>6.2}  leds {:08b}",
            status.duty_percent,
            if status.clockwise { "cw" } else { "ccw" },
            status.rpm,
            status.revolutions,
            bar
        );
    }

    motor.stop().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    leds.clear().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    println!();
    println!("stopped after {} encoder pulses", motor.feedback().pulses());

    Ok(())
}
