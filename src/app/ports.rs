//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (window relays, weather lookup, history file, event
//! sinks, config storage) implement these traits.  The
//! [`ControlLoop`](super::service::ControlLoop) consumes them via generics,
//! so the domain core never touches hardware directly.  Sensor
//! capabilities live next to their aggregator in [`crate::sensors`].
//!
//! Ports that wait on the physical world (window travel, network) return
//! futures; the history file and the event sink are quick and synchronous.

use core::future::Future;
use std::time::SystemTime;

use crate::config::SystemConfig;
use crate::control::RoomId;
use crate::error::{ActuatorError, NetworkError, PersistenceError};
use crate::history::HistoryRecord;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → window motors)
// ───────────────────────────────────────────────────────────────

/// Window motors.  Each call drives the motor for the configured travel
/// time and resolves once the relay is released again.
pub trait ActuatorPort {
    fn open(&mut self, room: RoomId) -> impl Future<Output = Result<(), ActuatorError>>;

    fn close(&mut self, room: RoomId) -> impl Future<Output = Result<(), ActuatorError>>;

    /// De-energise every relay immediately (start-up and shutdown).
    fn release_all(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Weather port (driven adapter: domain → outdoor temperature)
// ───────────────────────────────────────────────────────────────

pub trait WeatherProvider {
    /// Current outdoor temperature at `location`, in Celsius.
    fn current_outdoor_temperature(
        &mut self,
        location: &str,
    ) -> impl Future<Output = Result<f64, NetworkError>>;
}

// ───────────────────────────────────────────────────────────────
// History port (driven adapter: domain → tick log)
// ───────────────────────────────────────────────────────────────

/// Append-only tick log with wholesale retention pruning.
pub trait HistorySink {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), PersistenceError>;

    /// Drop every record when the log was last written more than the
    /// retention window before `now`.  Returns whether it did.
    fn truncate_if_stale(&mut self, now: SystemTime) -> Result<bool, PersistenceError>;

    /// Most recent record, `None` for a missing or empty log.
    fn load_last_record(&self) -> Result<Option<HistoryRecord>, PersistenceError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → operator / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, console, ...).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Returns [`ConfigError::NotFound`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first start).
    NotFound,
    /// Stored config could not be deserialized.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
