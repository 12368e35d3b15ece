//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They are the operator
//! notifications of the system: window movements, faults, fallbacks and
//! status snapshots.  Adapters on the other side decide how to show them.

use crate::control::{CommandRejected, RoomId, RoomState, Transition, WindowPosition};
use crate::error::{ActuatorError, NetworkError, PersistenceError, SensorError};
use crate::history::HistoryRecord;
use crate::sensors::SensorSample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop is about to start ticking.
    Started { tick_interval_secs: u32 },

    /// Window positions were seeded from the last history row.
    Restored {
        doctor: WindowPosition,
        computer: WindowPosition,
    },

    /// A window was driven to a new position.
    WindowMoved(Transition),

    /// Driving a window failed.  Its physical position is now uncertain.
    ActuatorFault { room: RoomId, error: ActuatorError },

    /// An input could not be read and a substitute was used.
    InputFallback(InputFallback),

    /// A fresh averaged CO2 sample.
    Sampled(SensorSample),

    AutoModeChanged { room: RoomId, enabled: bool },

    CommandRejected { room: RoomId, reason: CommandRejected },

    /// A history row was written.
    Recorded(HistoryRecord),

    /// The history log aged out and was cleared.
    HistoryPruned,

    PersistenceFault(PersistenceError),

    Status(StatusReport),
}

/// How a missing input was handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFallback {
    /// No CO2 sample; the computer room is not evaluated this tick.
    Co2Skipped(SensorError),
    /// The doctor-room reading failed and a constant was substituted.
    DoctorTemperature { substituted_c: f64, cause: SensorError },
    /// The weather lookup failed; the cached value (if any) is reused.
    OutdoorCached {
        cached_c: Option<f64>,
        cause: NetworkError,
    },
}

/// Point-in-time view of both rooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub outside_temp_c: Option<f64>,
    pub doctor: RoomState,
    pub computer: RoomState,
}
