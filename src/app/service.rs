//! Application service: the hexagonal core.
//!
//! [`ControlLoop`] owns both room controllers and the cached outdoor
//! temperature.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  TickInputs ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │       ControlLoop         │
//! ActuatorPort ◀──│  doctor · computer rooms  │ ──▶ HistorySink
//!                 └──────────────────────────┘
//! ```
//!
//! Within a tick the order is fixed: fallbacks, decisions, actuation,
//! then the history append.  A history row therefore never describes a
//! window movement that has not been commanded yet.

use std::time::SystemTime;

use heapless::Vec;
use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::control::{
    CommandRejected, Conditions, Decision, OpenReason, RoomController, RoomId, Transition,
    WindowPosition,
};
use crate::history::HistoryRecord;
use crate::sensors::{ClimateSensor, Co2Sensor};

use super::commands::AppCommand;
use super::events::{AppEvent, InputFallback, StatusReport};
use super::inputs::{InputGatherer, TickInputs};
use super::ports::{ActuatorPort, EventSink, HistorySink, WeatherProvider};

// ───────────────────────────────────────────────────────────────
// TickReport
// ───────────────────────────────────────────────────────────────

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// `None` when the room was not evaluated (manual mode or missing input).
    pub doctor: Option<Decision>,
    pub computer: Option<Decision>,
    pub fallbacks: Vec<InputFallback, 3>,
    pub record: HistoryRecord,
    /// Whether `record` reached the history sink.
    pub persisted: bool,
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    config: SystemConfig,
    doctor: RoomController,
    computer: RoomController,
    /// Last outdoor temperature the weather service returned.
    outside_temp_c: Option<f64>,
    tick_count: u64,
}

impl ControlLoop {
    /// Both windows closed, both rooms in manual mode.
    pub fn new(config: SystemConfig) -> Self {
        let doctor = RoomController::new(RoomId::DoctorRoom, config.doctor_room);
        let computer = RoomController::new(RoomId::ComputerRoom, config.computer_room);
        Self {
            config,
            doctor,
            computer,
            outside_temp_c: None,
            tick_count: 0,
        }
    }

    /// Seed window positions from the last history row.  Auto mode is
    /// never restored.
    pub fn restore(&mut self, history: &impl HistorySink, sink: &mut impl EventSink) {
        match history.load_last_record() {
            Ok(Some(last)) => {
                self.doctor.restore_position(last.doctor_position);
                self.computer.restore_position(last.computer_position);
                info!(
                    "restored positions: doctor={:?} computer={:?}",
                    last.doctor_position, last.computer_position
                );
                sink.emit(&AppEvent::Restored {
                    doctor: last.doctor_position,
                    computer: last.computer_position,
                });
            }
            Ok(None) => info!("no history, windows assumed closed"),
            Err(e) => {
                warn!("history unreadable, windows assumed closed: {e}");
                sink.emit(&AppEvent::PersistenceFault(e));
            }
        }
    }

    /// Release every relay and announce the loop.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Err(e) = hw.release_all() {
            error!("relay release at start-up failed: {e}");
        }
        sink.emit(&AppEvent::Started {
            tick_interval_secs: self.config.tick_interval_secs,
        });
    }

    /// Read inputs and run one tick.
    pub async fn tick<C, D, W>(
        &mut self,
        inputs: &mut InputGatherer<C, D, W>,
        hw: &mut impl ActuatorPort,
        history: &mut impl HistorySink,
        sink: &mut impl EventSink,
    ) -> TickReport
    where
        C: Co2Sensor,
        D: ClimateSensor,
        W: WeatherProvider,
    {
        let inputs = inputs.gather().await;
        self.apply(inputs, hw, history, sink).await
    }

    /// Run one tick over already gathered inputs.
    pub async fn apply(
        &mut self,
        inputs: TickInputs,
        hw: &mut impl ActuatorPort,
        history: &mut impl HistorySink,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;
        let mut fallbacks: Vec<InputFallback, 3> = Vec::new();

        // ── 1. Inputs and their fallbacks ────────────────────
        match inputs.outside_temp_c {
            Ok(t) => self.outside_temp_c = Some(t),
            Err(cause) => {
                warn!("weather lookup failed ({cause}), using {:?}", self.outside_temp_c);
                let _ = fallbacks.push(InputFallback::OutdoorCached {
                    cached_c: self.outside_temp_c,
                    cause,
                });
            }
        }

        let doctor_temp_c = match inputs.doctor_temp_c {
            Ok(t) => t,
            Err(cause) => {
                let substituted_c = self.config.doctor_fallback_temperature_c;
                warn!("doctor-room sensor failed ({cause}), assuming {substituted_c:.1} C");
                let _ = fallbacks.push(InputFallback::DoctorTemperature {
                    substituted_c,
                    cause,
                });
                substituted_c
            }
        };

        let sample = match inputs.co2 {
            Ok(sample) => {
                sink.emit(&AppEvent::Sampled(sample));
                Some(sample)
            }
            Err(cause) => {
                warn!("no CO2 sample ({cause}), computer room skipped this tick");
                let _ = fallbacks.push(InputFallback::Co2Skipped(cause));
                None
            }
        };

        for fallback in &fallbacks {
            sink.emit(&AppEvent::InputFallback(*fallback));
        }

        // ── 2. Decisions ─────────────────────────────────────
        let mut doctor = None;
        let mut computer = None;
        if let Some(outside_temp_c) = self.outside_temp_c {
            doctor = self.doctor.evaluate(&Conditions {
                indoor_temp_c: doctor_temp_c,
                outside_temp_c,
                co2_ppm: None,
            });
            if let Some(s) = sample {
                computer = self.computer.evaluate(&Conditions {
                    indoor_temp_c: s.temperature_c,
                    outside_temp_c,
                    co2_ppm: Some(s.co2_ppm),
                });
            }
        } else {
            warn!("outdoor temperature never known, rooms not evaluated");
            self.doctor.observe(doctor_temp_c, None);
            if let Some(s) = sample {
                self.computer.observe(s.temperature_c, Some(s.co2_ppm));
            }
        }

        // ── 3. Actuation ─────────────────────────────────────
        let transitions = [
            doctor.and_then(|d| d.transition(RoomId::DoctorRoom)),
            computer.and_then(|d| d.transition(RoomId::ComputerRoom)),
        ];
        for transition in transitions.into_iter().flatten() {
            self.actuate(transition, hw, sink).await;
        }

        // ── 4. History ───────────────────────────────────────
        let reason = computer
            .filter(|d| d.changed)
            .map_or(OpenReason::Unknown, |d| d.reason);
        let (record, persisted) = self.record(reason, history, sink);

        debug!("tick {} done", self.tick_count);
        TickReport {
            doctor,
            computer,
            fallbacks,
            record,
            persisted,
        }
    }

    /// Handle an operator command between ticks.
    pub async fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        history: &mut impl HistorySink,
        sink: &mut impl EventSink,
    ) -> Result<Option<Transition>, CommandRejected> {
        let transition = match cmd {
            AppCommand::Open(room) | AppCommand::Close(room) => {
                let target = if matches!(cmd, AppCommand::Open(_)) {
                    WindowPosition::Open
                } else {
                    WindowPosition::Closed
                };
                match self.room_mut(room).command(target) {
                    Ok(None) => {
                        info!("{room}: window already {:?}", target);
                        None
                    }
                    Ok(Some(t)) => Some(t),
                    Err(reason) => {
                        warn!("{room}: {:?} refused, {reason}", cmd);
                        sink.emit(&AppEvent::CommandRejected { room, reason });
                        return Err(reason);
                    }
                }
            }
            AppCommand::ToggleAutoMode(room) => {
                let (enabled, closing) = self.room_mut(room).toggle_auto_mode();
                if let Some(t) = closing {
                    self.actuate(t, hw, sink).await;
                }
                sink.emit(&AppEvent::AutoModeChanged { room, enabled });
                if closing.is_some() {
                    self.record(OpenReason::Unknown, history, sink);
                }
                return Ok(closing);
            }
            AppCommand::ReportStatus => {
                sink.emit(&AppEvent::Status(self.status()));
                None
            }
        };

        if let Some(t) = transition {
            self.actuate(t, hw, sink).await;
            self.record(OpenReason::Unknown, history, sink);
        }
        Ok(transition)
    }

    /// De-energise every relay (shutdown).
    pub fn shutdown(&mut self, hw: &mut impl ActuatorPort) {
        match hw.release_all() {
            Ok(()) => info!("relays released"),
            Err(e) => error!("relay release at shutdown failed: {e}"),
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn room(&self, room: RoomId) -> &RoomController {
        match room {
            RoomId::DoctorRoom => &self.doctor,
            RoomId::ComputerRoom => &self.computer,
        }
    }

    pub fn outside_temp_c(&self) -> Option<f64> {
        self.outside_temp_c
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            outside_temp_c: self.outside_temp_c,
            doctor: *self.doctor.state(),
            computer: *self.computer.state(),
        }
    }

    // ── Internal ─────────────────────────────────────────────

    fn room_mut(&mut self, room: RoomId) -> &mut RoomController {
        match room {
            RoomId::DoctorRoom => &mut self.doctor,
            RoomId::ComputerRoom => &mut self.computer,
        }
    }

    /// Drive one window.  A failure is reported and leaves the new
    /// position in place; it is not retried.
    async fn actuate(
        &mut self,
        t: Transition,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let outcome = match t.to {
            WindowPosition::Open => hw.open(t.room).await,
            WindowPosition::Closed => hw.close(t.room).await,
        };
        self.room_mut(t.room).record_actuation(outcome);

        match outcome {
            Ok(()) => sink.emit(&AppEvent::WindowMoved(t)),
            Err(error) => {
                error!("{}: moving window to {:?} failed: {error}", t.room, t.to);
                sink.emit(&AppEvent::ActuatorFault {
                    room: t.room,
                    error,
                });
            }
        }
    }

    /// Append the current state, then prune stale history.
    fn record(
        &self,
        reason: OpenReason,
        history: &mut impl HistorySink,
        sink: &mut impl EventSink,
    ) -> (HistoryRecord, bool) {
        let record = HistoryRecord::snapshot(
            self.outside_temp_c,
            self.doctor.state(),
            self.computer.state(),
            reason,
        );

        let persisted = match history.append(&record) {
            Ok(()) => {
                sink.emit(&AppEvent::Recorded(record));
                true
            }
            Err(e) => {
                error!("history append failed: {e}");
                sink.emit(&AppEvent::PersistenceFault(e));
                false
            }
        };

        match history.truncate_if_stale(SystemTime::now()) {
            Ok(true) => sink.emit(&AppEvent::HistoryPruned),
            Ok(false) => {}
            Err(e) => {
                error!("history pruning failed: {e}");
                sink.emit(&AppEvent::PersistenceFault(e));
            }
        }

        (record, persisted)
    }
}
