//! One controller per room: owns the [`RoomState`] and is the only place
//! its window position changes.
//!
//! Every mutation returns the [`Transition`] the caller must carry out on
//! the actuator.  The controller itself never touches hardware.

use log::{debug, info};

use super::rules::{self, Rule};
use super::{Conditions, Decision, OpenReason, RoomId, RoomState, Transition, WindowPosition};
use crate::config::RoomLimits;
use crate::error::ActuatorError;

/// Why a manual command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejected {
    /// Manual open/close is ignored while the rule table owns the window.
    AutoModeActive,
}

impl core::fmt::Display for CommandRejected {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AutoModeActive => write!(f, "auto mode is on"),
        }
    }
}

pub struct RoomController {
    room: RoomId,
    limits: RoomLimits,
    rules: &'static [Rule],
    state: RoomState,
}

impl RoomController {
    /// A closed window in manual mode.
    pub fn new(room: RoomId, limits: RoomLimits) -> Self {
        Self {
            room,
            limits,
            rules: rules::rule_table(room),
            state: RoomState::default(),
        }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    pub fn position(&self) -> WindowPosition {
        self.state.position
    }

    pub fn is_auto(&self) -> bool {
        self.state.auto_mode
    }

    /// Seed the position from persisted history.  Start-up only; auto mode
    /// is deliberately left untouched.
    pub fn restore_position(&mut self, position: WindowPosition) {
        self.state.position = position;
    }

    /// Cache the latest readings for status reporting and history rows.
    pub fn observe(&mut self, indoor_temp_c: f64, co2_ppm: Option<f64>) {
        self.state.indoor_temp_c = Some(indoor_temp_c);
        if co2_ppm.is_some() {
            self.state.co2_ppm = co2_ppm;
        }
    }

    /// Pure decision for the current position; does not mutate state.
    pub fn decide(&self, conditions: &Conditions) -> Decision {
        rules::decide(self.rules, &self.limits, conditions, self.state.position)
    }

    /// Per-tick entry point.  Caches the readings and, in auto mode,
    /// applies the rule table.  Returns `None` in manual mode.
    pub fn evaluate(&mut self, conditions: &Conditions) -> Option<Decision> {
        self.observe(conditions.indoor_temp_c, conditions.co2_ppm);
        if !self.state.auto_mode {
            return None;
        }

        let decision = self.decide(conditions);
        if decision.changed {
            debug!(
                "{}: rule '{}' moves window {:?} -> {:?}",
                self.room,
                decision.rule.unwrap_or("-"),
                self.state.position,
                decision.position
            );
            self.state.position = decision.position;
        }
        Some(decision)
    }

    /// Manual open/close.  `Ok(None)` when the window is already there.
    pub fn command(
        &mut self,
        target: WindowPosition,
    ) -> Result<Option<Transition>, CommandRejected> {
        if self.state.auto_mode {
            return Err(CommandRejected::AutoModeActive);
        }
        Ok(self.move_to(target, OpenReason::Unknown))
    }

    /// Flip auto mode.  An open window is closed first in either
    /// direction so the new mode always starts from a closed window.
    pub fn toggle_auto_mode(&mut self) -> (bool, Option<Transition>) {
        let closing = self.move_to(WindowPosition::Closed, OpenReason::Unknown);
        self.state.auto_mode = !self.state.auto_mode;
        info!(
            "{}: auto mode {}",
            self.room,
            if self.state.auto_mode { "on" } else { "off" }
        );
        (self.state.auto_mode, closing)
    }

    /// Record the actuator outcome of the last transition.  A failure keeps
    /// the new position but marks the room as physically uncertain.
    pub fn record_actuation(&mut self, outcome: Result<(), ActuatorError>) {
        self.state.actuator_fault = outcome.err();
    }

    fn move_to(&mut self, to: WindowPosition, reason: OpenReason) -> Option<Transition> {
        let from = self.state.position;
        if from == to {
            return None;
        }
        self.state.position = to;
        Some(Transition {
            room: self.room,
            from,
            to,
            reason,
        })
    }
}

impl Decision {
    /// The actuator work implied by this decision, if any.
    pub fn transition(&self, room: RoomId) -> Option<Transition> {
        self.changed.then(|| Transition {
            room,
            from: self.position.toggled(),
            to: self.position,
            reason: self.reason,
        })
    }
}

impl WindowPosition {
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}
