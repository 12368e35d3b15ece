//! Inbound commands to the control loop.
//!
//! These represent operator actions from the console (or any other input
//! surface) that the [`ControlLoop`](super::service::ControlLoop)
//! interprets between ticks.

use crate::control::RoomId;

/// Commands that input adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Open the window.  Refused while the room is in auto mode.
    Open(RoomId),

    /// Close the window.  Refused while the room is in auto mode.
    Close(RoomId),

    /// Switch auto mode on or off, closing an open window first.
    ToggleAutoMode(RoomId),

    /// Emit a status snapshot of both rooms.
    ReportStatus,
}
