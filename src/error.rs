//! Error types for the room ventilation controller.
//!
//! One enum per category.  Every category is recovered where it happens
//! (see the table), so only a caller bug surfaces as the top-level
//! [`Error`].  All variants are `Copy` so they travel through events and
//! tick reports without allocation.
//!
//! Recovery policy per category:
//!
//! | Error               | Recovered by                                   |
//! |---------------------|------------------------------------------------|
//! | `SensorUnavailable` | skipping the computer-room decision this tick  |
//! | `ReadFailure`       | the doctor-room fallback temperature           |
//! | `NetworkError`      | the cached outdoor temperature                 |
//! | `ActuatorError`     | operator notification, room flagged uncertain  |
//! | `PersistenceError`  | operator notification, tick still completes    |
//! | `InvalidRoomSelector` | nothing: it is a caller bug                  |

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A raw room selector outside the two known rooms.
    InvalidRoomSelector(i64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoomSelector(raw) => {
                write!(f, "room selector {raw} does not name a room (use 0 or 1)")
            }
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// CO2 sensor failed its handshake or never signalled data-ready.
    SensorUnavailable,
    /// Doctor-room temperature/humidity sensor returned no data.
    ReadFailure,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorUnavailable => write!(f, "CO2 sensor unavailable"),
            Self::ReadFailure => write!(f, "temperature sensor read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The relay could not be energised; the window did not move.
    GpioWriteFailed,
    /// The relay could not be released after travel; it may still be driving.
    ReleaseFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "relay write failed"),
            Self::ReleaseFailed => write!(f, "relay release failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The weather service could not be reached.
    Unreachable,
    /// The weather service answered with something we could not use.
    BadResponse,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "weather service unreachable"),
            Self::BadResponse => write!(f, "weather service returned an unusable response"),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceError {
    /// Underlying file I/O failed.
    Io(std::io::ErrorKind),
    /// A stored row could not be encoded or decoded.
    Format,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
            Self::Format => write!(f, "malformed history row"),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(io) => Self::Io(io.kind()),
            _ => Self::Format,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
