//! Interrupt-driven encoder feedback: speed, direction and revolution count.
//!
//! Each motor's hall encoder produces a pulse train on its speed-sense pin
//! and a direction level on its direction-sense pin. Every falling edge on
//! the speed pin fires the single shared GPIO interrupt, which looks the
//! pin up in an [`EncoderRegistry`] and updates that encoder's
//! [`EncoderFeedback`].
//!
//! # Concurrency
//!
//! Sensed values are written only from the interrupt handler and read from
//! the main context. Everything is stored in atomics using plain loads and
//! stores (no read-modify-write), so the same code works on cores without
//! atomic CAS such as the Cortex-M0+.
//!
//! Registration is append-only and is expected to finish before the
//! platform starts delivering edges for the registered pin.
//!
//! # Example
//!
//! ```rust
//! use rs_drivers::encoder::{EncoderRegistry, rpm_from_interval};
//! use rs_drivers::hal::MockGpio;
//!
//! static REGISTRY: EncoderRegistry<2> = EncoderRegistry::new();
//!
//! let feedback = REGISTRY.register(15, 14, 285.6).unwrap();
//! let gpio = MockGpio::new(); // direction pin reads low -> clockwise
//!
//! REGISTRY.dispatch(&gpio, 15, 1_000);
//! REGISTRY.dispatch(&gpio, 15, 101_000);
//!
//! assert!(feedback.is_clockwise());
//! assert_eq!(feedback.rpm(), rpm_from_interval(100_000, 285.6));
//! ```

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use critical_section::Mutex;

use crate::error::RegistryError;
use crate::traits::{Gpio, MicrosClock, Pin};

/// Number of encoders the global [`ENCODERS`] registry can hold.
pub const MAX_ENCODERS: usize = 8;

const MICROS_PER_MINUTE: f32 = 60_000_000.0;

/// Process-wide registry used by [`MotorController::new`](crate::MotorController::new)
/// and [`on_speed_edge`].
pub static ENCODERS: EncoderRegistry<MAX_ENCODERS> = EncoderRegistry::new();

/// Route a speed-pin edge to the owning encoder in [`ENCODERS`].
///
/// Call this from the platform's GPIO interrupt handler. Returns `false`
/// if no encoder is registered on `pin`.
#[inline]
pub fn on_speed_edge<G: Gpio + ?Sized>(gpio: &G, pin: Pin, now_us: u32) -> bool {
    ENCODERS.dispatch(gpio, pin, now_us)
}

/// Convert the interval between two encoder pulses into output-shaft RPM.
///
/// Returns 0 for a zero interval or a non-positive pulse count.
#[inline]
pub fn rpm_from_interval(elapsed_us: u32, pulses_per_revolution: f32) -> f32 {
    let denominator = elapsed_us as f32 * pulses_per_revolution;
    if denominator > 0.0 {
        MICROS_PER_MINUTE / denominator
    } else {
        0.0
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Latest sensed state of one encoder.
///
/// Written from interrupt context by [`record_edge`](Self::record_edge);
/// safe to read from anywhere.
#[derive(Debug)]
pub struct EncoderFeedback {
    rpm_bits: AtomicU32,
    clockwise: AtomicBool,
    pulses: AtomicU32,
    last_edge_us: AtomicU32,
    has_last_edge: AtomicBool,
    pulses_per_rev_bits: AtomicU32,
}

impl EncoderFeedback {
    /// Zeroed feedback: no speed, counter-clockwise, no pulses.
    pub const fn new() -> Self {
        Self {
            rpm_bits: AtomicU32::new(0),
            clockwise: AtomicBool::new(false),
            pulses: AtomicU32::new(0),
            last_edge_us: AtomicU32::new(0),
            has_last_edge: AtomicBool::new(false),
            pulses_per_rev_bits: AtomicU32::new(0),
        }
    }

    /// Latest speed estimate in revolutions per minute.
    #[inline]
    pub fn rpm(&self) -> f32 {
        f32::from_bits(self.rpm_bits.load(Ordering::Relaxed))
    }

    /// Last known rotation direction, sensed or commanded.
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.clockwise.load(Ordering::Relaxed)
    }

    /// Overwrite the direction flag with a commanded value.
    #[inline]
    pub fn set_clockwise(&self, clockwise: bool) {
        self.clockwise.store(clockwise, Ordering::Relaxed);
    }

    /// Number of pulses counted since registration.
    #[inline]
    pub fn pulses(&self) -> u32 {
        self.pulses.load(Ordering::Relaxed)
    }

    /// Encoder pulses per output-shaft revolution.
    #[inline]
    pub fn pulses_per_revolution(&self) -> f32 {
        f32::from_bits(self.pulses_per_rev_bits.load(Ordering::Relaxed))
    }

    /// Set the encoder resolution used for speed and revolution math.
    pub fn set_pulses_per_revolution(&self, pulses: f32) {
        self.pulses_per_rev_bits
            .store(pulses.to_bits(), Ordering::Relaxed);
    }

    /// Cumulative output-shaft revolutions since registration.
    ///
    /// Derived from the pulse counter so a read can never observe a
    /// half-written value.
    pub fn revolutions(&self) -> f32 {
        let ppr = self.pulses_per_revolution();
        if ppr > 0.0 {
            self.pulses() as f32 / ppr
        } else {
            0.0
        }
    }

    /// Interrupt-side update for one falling edge on the speed pin.
    ///
    /// `direction_high` is the level of the direction-sense pin at the time
    /// of the edge; the encoder pulls it low while turning clockwise.
    ///
    /// The first edge is counted as a pulse but has no interval to time, so
    /// it leaves the speed at 0 and only establishes the timing baseline.
    /// Later edges update speed and the pulse counter when time has strictly
    /// advanced since the previous edge; otherwise the edge is dropped and
    /// the previous speed kept. A 32-bit counter wrap therefore costs
    /// exactly one sample.
    pub fn record_edge(&self, now_us: u32, direction_high: bool) {
        self.clockwise.store(!direction_high, Ordering::Relaxed);

        if self.has_last_edge.load(Ordering::Relaxed) {
            let last = self.last_edge_us.load(Ordering::Relaxed);
            if now_us > last {
                let elapsed = now_us - last;
                let rpm = rpm_from_interval(elapsed, self.pulses_per_revolution());

                self.count_pulse();
                self.rpm_bits.store(rpm.to_bits(), Ordering::Relaxed);
            }
        } else {
            self.count_pulse();
        }

        self.last_edge_us.store(now_us, Ordering::Relaxed);
        self.has_last_edge.store(true, Ordering::Relaxed);
    }

    #[inline]
    fn count_pulse(&self) {
        // single writer: load + store is enough
        let pulses = self.pulses.load(Ordering::Relaxed).wrapping_add(1);
        self.pulses.store(pulses, Ordering::Relaxed);
    }
}

impl Default for EncoderFeedback {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug)]
struct EncoderSlot {
    speed_pin: AtomicU32,
    direction_pin: AtomicU32,
    feedback: EncoderFeedback,
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: EncoderSlot = EncoderSlot {
    speed_pin: AtomicU32::new(0),
    direction_pin: AtomicU32::new(0),
    feedback: EncoderFeedback::new(),
};

/// Append-only map from speed-sense pin to encoder feedback.
///
/// Holds storage for `N` encoders inline so it can live in a `static`
/// without allocation. Entries are never removed.
pub struct EncoderRegistry<const N: usize> {
    slots: [EncoderSlot; N],
    claimed: Mutex<Cell<usize>>,
    published: AtomicUsize,
}

impl<const N: usize> EncoderRegistry<N> {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: [EMPTY_SLOT; N],
            claimed: Mutex::new(Cell::new(0)),
            published: AtomicUsize::new(0),
        }
    }

    /// Maximum number of encoders.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of registered encoders.
    #[inline]
    pub fn len(&self) -> usize {
        self.published.load(Ordering::Acquire)
    }

    /// Returns true if nothing has been registered yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register an encoder and hand out its feedback cell.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicatePin`] if `speed_pin` already has an owner,
    /// [`RegistryError::Full`] if all `N` slots are taken.
    pub fn register(
        &'static self,
        speed_pin: Pin,
        direction_pin: Pin,
        pulses_per_revolution: f32,
    ) -> Result<&'static EncoderFeedback, RegistryError> {
        critical_section::with(|cs| {
            let claimed = self.claimed.borrow(cs);
            let index = claimed.get();

            if self.slots[..index]
                .iter()
                .any(|slot| slot.speed_pin.load(Ordering::Relaxed) == speed_pin)
            {
                return Err(RegistryError::DuplicatePin(speed_pin));
            }

            let slot = self
                .slots
                .get(index)
                .ok_or(RegistryError::Full { capacity: N })?;

            slot.speed_pin.store(speed_pin, Ordering::Relaxed);
            slot.direction_pin.store(direction_pin, Ordering::Relaxed);
            slot.feedback
                .set_pulses_per_revolution(pulses_per_revolution);

            claimed.set(index + 1);
            // publish after the slot is fully written
            self.published.store(index + 1, Ordering::Release);

            Ok(&slot.feedback)
        })
    }

    /// Feedback registered for `speed_pin`, if any.
    pub fn feedback(&self, speed_pin: Pin) -> Option<&EncoderFeedback> {
        self.find(speed_pin).map(|slot| &slot.feedback)
    }

    /// Handle a falling edge on `pin` observed at `now_us`.
    ///
    /// Reads the owning encoder's direction pin through `gpio` and updates
    /// its feedback. Non-blocking and allocation-free; edges on pins that
    /// were never registered are ignored and reported as `false`.
    pub fn dispatch<G: Gpio + ?Sized>(&self, gpio: &G, pin: Pin, now_us: u32) -> bool {
        match self.find(pin) {
            Some(slot) => {
                let direction_high = gpio.is_high(slot.direction_pin.load(Ordering::Relaxed));
                slot.feedback.record_edge(now_us, direction_high);
                true
            }
            None => false,
        }
    }

    /// [`dispatch`](Self::dispatch) timestamped with `clock`.
    #[inline]
    pub fn dispatch_now<G, C>(&self, gpio: &G, clock: &C, pin: Pin) -> bool
    where
        G: Gpio + ?Sized,
        C: MicrosClock + ?Sized,
    {
        self.dispatch(gpio, pin, clock.now_us())
    }

    fn find(&self, speed_pin: Pin) -> Option<&EncoderSlot> {
        let len = self.published.load(Ordering::Acquire);
        self.slots[..len]
            .iter()
            .find(|slot| slot.speed_pin.load(Ordering::Relaxed) == speed_pin)
    }
}

impl<const N: usize> fmt::Debug for EncoderRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderRegistry")
            .field("len", &self.len())
            .field("capacity", &N)
            .finish()
    }
}

impl<const N: usize> Default for EncoderRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockGpio};
    use crate::traits::Gpio;

    extern crate std;
    use std::boxed::Box;

    const PPR: f32 = 20.4 * 14.0;

    fn registry<const N: usize>() -> &'static EncoderRegistry<N> {
        Box::leak(Box::new(EncoderRegistry::new()))
    }

    // =========================================================================
    // RPM math
    // =========================================================================

    #[test]
    fn rpm_for_100ms_interval() {
        let rpm = rpm_from_interval(100_000, PPR);
        assert!((rpm - 60_000_000.0 / (100_000.0 * 285.6)).abs() < 1e-4);
        assert!((rpm - 2.1008).abs() < 1e-3);
    }

    #[test]
    fn rpm_scales_inversely_with_interval() {
        let slow = rpm_from_interval(2_000, PPR);
        let fast = rpm_from_interval(1_000, PPR);
        assert!((fast - 2.0 * slow).abs() < 1e-3);
    }

    // =========================================================================
    // EncoderFeedback
    // =========================================================================

    #[test]
    fn feedback_starts_zeroed() {
        let feedback = EncoderFeedback::new();
        assert_eq!(feedback.rpm(), 0.0);
        assert_eq!(feedback.pulses(), 0);
        assert_eq!(feedback.revolutions(), 0.0);
        assert!(!feedback.is_clockwise());
    }

    #[test]
    fn first_edge_counts_pulse_without_speed() {
        let feedback = EncoderFeedback::new();
        feedback.set_pulses_per_revolution(PPR);

        feedback.record_edge(5_000, false);

        assert_eq!(feedback.rpm(), 0.0);
        assert_eq!(feedback.pulses(), 1);
        assert!(feedback.is_clockwise());
    }

    #[test]
    fn second_edge_updates_speed_and_pulses() {
        let feedback = EncoderFeedback::new();
        feedback.set_pulses_per_revolution(PPR);

        feedback.record_edge(0, true);
        feedback.record_edge(100_000, true);

        assert_eq!(feedback.rpm(), rpm_from_interval(100_000, PPR));
        assert_eq!(feedback.pulses(), 2);
        assert!((feedback.revolutions() - 2.0 / PPR).abs() < 1e-7);
        assert!(!feedback.is_clockwise());
    }

    #[test]
    fn identical_timestamp_keeps_previous_rpm() {
        let feedback = EncoderFeedback::new();
        feedback.set_pulses_per_revolution(PPR);

        feedback.record_edge(1_000, false);
        feedback.record_edge(2_000, false);
        let before = feedback.rpm();

        feedback.record_edge(2_000, false);

        assert_eq!(feedback.rpm(), before);
        assert_eq!(feedback.pulses(), 2);
    }

    #[test]
    fn counter_wrap_drops_one_sample() {
        let feedback = EncoderFeedback::new();
        feedback.set_pulses_per_revolution(PPR);

        feedback.record_edge(u32::MAX - 500, false);
        feedback.record_edge(u32::MAX - 100, false);
        let before = feedback.rpm();

        // wrapped: now < last, skipped
        feedback.record_edge(300, false);
        assert_eq!(feedback.rpm(), before);
        assert_eq!(feedback.pulses(), 2);

        // baseline moved to 300
        feedback.record_edge(700, false);
        assert_eq!(feedback.rpm(), rpm_from_interval(400, PPR));
        assert_eq!(feedback.pulses(), 3);
    }

    #[test]
    fn direction_tracks_every_edge() {
        let feedback = EncoderFeedback::new();
        feedback.record_edge(10, false);
        assert!(feedback.is_clockwise());
        feedback.record_edge(10, true);
        assert!(!feedback.is_clockwise());
    }

    #[test]
    fn revolutions_without_resolution_is_zero() {
        let feedback = EncoderFeedback::new();
        feedback.record_edge(0, false);
        feedback.record_edge(10, false);
        assert_eq!(feedback.pulses(), 2);
        assert_eq!(feedback.revolutions(), 0.0);
    }

    // =========================================================================
    // EncoderRegistry
    // =========================================================================

    #[test]
    fn register_and_lookup() {
        let registry = registry::<2>();
        assert!(registry.is_empty());
        assert_eq!(registry.capacity(), 2);

        let feedback = registry.register(3, 4, PPR).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(feedback.pulses_per_revolution(), PPR);
        assert!(core::ptr::eq(registry.feedback(3).unwrap(), feedback));
        assert!(registry.feedback(4).is_none());
    }

    #[test]
    fn register_rejects_duplicate_speed_pin() {
        let registry = registry::<2>();
        registry.register(3, 4, PPR).unwrap();

        assert_eq!(
            registry.register(3, 9, PPR).unwrap_err(),
            RegistryError::DuplicatePin(3)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_rejects_when_full() {
        let registry = registry::<1>();
        registry.register(3, 4, PPR).unwrap();

        assert_eq!(
            registry.register(5, 6, PPR).unwrap_err(),
            RegistryError::Full { capacity: 1 }
        );
    }

    #[test]
    fn dispatch_routes_by_speed_pin() {
        let registry = registry::<4>();
        let left = registry.register(10, 11, PPR).unwrap();
        let right = registry.register(20, 21, PPR).unwrap();

        let mut gpio = MockGpio::new();
        gpio.set_input(11, false);
        gpio.set_input(21, true);

        assert!(registry.dispatch(&gpio, 10, 0));
        assert!(registry.dispatch(&gpio, 20, 0));
        assert!(registry.dispatch(&gpio, 10, 50_000));
        assert!(registry.dispatch(&gpio, 20, 200_000));

        assert!(left.is_clockwise());
        assert!(!right.is_clockwise());
        assert_eq!(left.rpm(), rpm_from_interval(50_000, PPR));
        assert_eq!(right.rpm(), rpm_from_interval(200_000, PPR));
    }

    #[test]
    fn interleaved_edges_use_per_encoder_timestamps() {
        let registry = registry::<2>();
        let a = registry.register(1, 2, PPR).unwrap();
        let b = registry.register(3, 4, PPR).unwrap();
        let gpio = MockGpio::new();

        registry.dispatch(&gpio, 1, 0);
        registry.dispatch(&gpio, 3, 10_000);
        registry.dispatch(&gpio, 1, 100_000);
        registry.dispatch(&gpio, 3, 110_000);

        assert_eq!(a.rpm(), rpm_from_interval(100_000, PPR));
        assert_eq!(b.rpm(), rpm_from_interval(100_000, PPR));
    }

    #[test]
    fn dispatch_ignores_unknown_pin() {
        let registry = registry::<2>();
        let feedback = registry.register(1, 2, PPR).unwrap();
        let gpio = MockGpio::new();

        assert!(!registry.dispatch(&gpio, 7, 1_000));
        assert_eq!(feedback.pulses(), 0);
    }

    #[test]
    fn dispatch_now_reads_clock() {
        let registry = registry::<1>();
        let feedback = registry.register(1, 2, PPR).unwrap();
        let gpio = MockGpio::new();
        let mut clock = MockClock::new();

        registry.dispatch_now(&gpio, &clock, 1);
        clock.advance(25_000);
        registry.dispatch_now(&gpio, &clock, 1);

        assert_eq!(feedback.rpm(), rpm_from_interval(25_000, PPR));
    }

    #[test]
    fn gpio_reads_direction_pin_not_speed_pin() {
        let registry = registry::<1>();
        let feedback = registry.register(1, 2, PPR).unwrap();
        let mut gpio = MockGpio::new();
        gpio.set_input(1, true);
        gpio.set_input(2, false);

        registry.dispatch(&gpio, 1, 0);
        assert!(feedback.is_clockwise());
        assert!(gpio.is_high(1));
    }
}
