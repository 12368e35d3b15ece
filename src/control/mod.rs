//! Per-room window control: data model, rule tables, and the controller.
//!
//! ```text
//!   Conditions ──▶ ┌──────────────────────────────┐
//!                  │ RoomController               │
//!   position ────▶ │  rules: &'static [Rule]       │ ──▶ Decision
//!                  │  first matching rule wins     │     (position, reason, changed)
//!                  └──────────────────────────────┘
//! ```
//!
//! Both rooms share one decision shape; what differs is the ordered rule
//! table ([`rules::DOCTOR_ROOM_RULES`], [`rules::COMPUTER_ROOM_RULES`]) and
//! the [`RoomLimits`](crate::config::RoomLimits) it is evaluated against.
//! Nothing in this module performs I/O.

pub mod room;
pub mod rules;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{self, ActuatorError, Error};

pub use room::{CommandRejected, RoomController};

// ---------------------------------------------------------------------------
// Room identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoomId {
    DoctorRoom = 0,
    ComputerRoom = 1,
}

impl RoomId {
    pub const ALL: [RoomId; 2] = [RoomId::DoctorRoom, RoomId::ComputerRoom];

    pub fn name(self) -> &'static str {
        match self {
            Self::DoctorRoom => "doctor",
            Self::ComputerRoom => "computer",
        }
    }

    /// Room for a numeric selector (0 = doctor, 1 = computer).
    pub fn from_selector(raw: i64) -> error::Result<Self> {
        match raw {
            0 => Ok(Self::DoctorRoom),
            1 => Ok(Self::ComputerRoom),
            other => Err(Error::InvalidRoomSelector(other)),
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stored codes (history file columns)
// ---------------------------------------------------------------------------

/// A stored integer code that maps to no known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCode {
    pub field: &'static str,
    pub value: u8,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code {}", self.field, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum WindowPosition {
    #[default]
    Closed = 0,
    Open = 1,
}

impl From<WindowPosition> for u8 {
    fn from(p: WindowPosition) -> Self {
        p as u8
    }
}

impl TryFrom<u8> for WindowPosition {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Closed),
            1 => Ok(Self::Open),
            value => Err(UnknownCode {
                field: "window position",
                value,
            }),
        }
    }
}

/// Why a window was opened.  Logged only; never feeds back into decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum OpenReason {
    #[default]
    Unknown = 0,
    TemperatureTrigger = 1,
    Co2Trigger = 2,
}

impl From<OpenReason> for u8 {
    fn from(r: OpenReason) -> Self {
        r as u8
    }
}

impl TryFrom<u8> for OpenReason {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::TemperatureTrigger),
            2 => Ok(Self::Co2Trigger),
            value => Err(UnknownCode {
                field: "open reason",
                value,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Room state
// ---------------------------------------------------------------------------

/// Mutable control state of one room.  Owned by its [`RoomController`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoomState {
    pub position: WindowPosition,
    /// When false, manual commands apply and automatic transitions do not.
    pub auto_mode: bool,
    /// Last indoor temperature seen by the control loop (Celsius).
    pub indoor_temp_c: Option<f64>,
    /// Last CO2 concentration seen by the control loop (ppm).
    pub co2_ppm: Option<f64>,
    /// Set when the last movement failed; the physical window may not
    /// match `position` until a later movement succeeds.
    pub actuator_fault: Option<ActuatorError>,
}

// ---------------------------------------------------------------------------
// Decision inputs and outputs
// ---------------------------------------------------------------------------

/// Measurements a decision is made from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub indoor_temp_c: f64,
    pub outside_temp_c: f64,
    /// Present only for rooms with a CO2 sensor.
    pub co2_ppm: Option<f64>,
}

impl Conditions {
    /// Indoor minus outdoor temperature.
    pub fn differential(&self) -> f64 {
        self.indoor_temp_c - self.outside_temp_c
    }
}

/// Result of evaluating a rule table once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub position: WindowPosition,
    /// `Unknown` unless this decision opens the window.
    pub reason: OpenReason,
    pub changed: bool,
    /// Label of the rule that matched, `None` when no rule did.
    pub rule: Option<&'static str>,
}

impl Decision {
    pub fn hold(position: WindowPosition) -> Self {
        Self {
            position,
            reason: OpenReason::Unknown,
            changed: false,
            rule: None,
        }
    }
}

/// A position change that has been applied to a [`RoomState`] and must
/// now be carried out by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub room: RoomId,
    pub from: WindowPosition,
    pub to: WindowPosition,
    pub reason: OpenReason,
}
