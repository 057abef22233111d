//! Error types surfaced during driver construction.
//!
//! Runtime operations only ever fail with the platform's own error type;
//! the types here cover the few things that can go wrong while wiring a
//! motor into the encoder interrupt registry.

use core::fmt;

use crate::traits::Pin;

/// Failure to add an encoder to an [`EncoderRegistry`](crate::encoder::EncoderRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Every slot is already taken.
    Full {
        /// Number of slots in the registry.
        capacity: usize,
    },
    /// Another encoder already owns this speed-sense pin.
    DuplicatePin(Pin),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full { capacity } => {
                write!(f, "encoder registry full ({} slots)", capacity)
            }
            RegistryError::DuplicatePin(pin) => {
                write!(f, "speed pin {} is already registered", pin)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

/// Error returned by [`MotorController::new`](crate::MotorController::new).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotorError<E> {
    /// The platform rejected a pin, PWM or interrupt configuration.
    Hardware(E),
    /// The speed-sense pin could not be registered.
    Registry(RegistryError),
}

impl<E> From<RegistryError> for MotorError<E> {
    fn from(err: RegistryError) -> Self {
        MotorError::Registry(err)
    }
}

impl<E: fmt::Debug> fmt::Display for MotorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::Hardware(err) => write!(f, "hardware error: {:?}", err),
            MotorError::Registry(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for MotorError<E> {}
