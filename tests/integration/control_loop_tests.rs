//! Integration tests for the ControlLoop → rule tables → actuators → history
//! pipeline.
//!
//! Every test drives [`ControlLoop::apply`] or
//! [`ControlLoop::handle_command`] with scripted inputs and checks what
//! reached the mock actuator, the history journal and the event sink.

use futures_lite::future::block_on;

use crate::mock_hw::{
    MemoryHistory, MockActuator, RecordingSink, Step, inputs, journal, sample, without_co2,
    without_doctor, without_weather,
};
use roomvent::adapters::sim::{
    SimClimateSensor, SimCo2Sensor, SimCommand, SimEnvironment, SimWeather,
};
use roomvent::app::commands::AppCommand;
use roomvent::app::events::{AppEvent, InputFallback};
use roomvent::app::inputs::{InputGatherer, TickInputs};
use roomvent::app::service::{ControlLoop, TickReport};
use roomvent::config::SystemConfig;
use roomvent::control::{CommandRejected, OpenReason, RoomId, Transition, WindowPosition};
use roomvent::error::{ActuatorError, NetworkError, PersistenceError, SensorError};
use roomvent::history::HistoryRecord;

use RoomId::{ComputerRoom, DoctorRoom};
use WindowPosition::{Closed, Open};

struct Rig {
    app: ControlLoop,
    hw: MockActuator,
    history: MemoryHistory,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        let j = journal();
        Self {
            app: ControlLoop::new(SystemConfig::default()),
            hw: MockActuator::new(j.clone()),
            history: MemoryHistory::new(j),
            sink: RecordingSink::new(),
        }
    }

    fn command(&mut self, cmd: AppCommand) -> Result<Option<Transition>, CommandRejected> {
        block_on(
            self.app
                .handle_command(cmd, &mut self.hw, &mut self.history, &mut self.sink),
        )
    }

    fn auto(&mut self, room: RoomId) {
        self.command(AppCommand::ToggleAutoMode(room)).unwrap();
        assert!(self.app.room(room).is_auto());
    }

    fn tick(&mut self, i: TickInputs) -> TickReport {
        block_on(
            self.app
                .apply(i, &mut self.hw, &mut self.history, &mut self.sink),
        )
    }

    fn journal(&self) -> Vec<Step> {
        self.hw.journal.borrow().clone()
    }
}

// ── Automatic control ─────────────────────────────────────────

#[test]
fn warm_computer_room_opens_then_cold_outdoor_closes() {
    let mut rig = Rig::new();
    rig.auto(ComputerRoom);

    let report = rig.tick(inputs(21.0, sample(24.0, 700.0), 18.0));
    let decision = report.computer.unwrap();
    assert_eq!(decision.position, Open);
    assert!(decision.changed);
    assert_eq!(decision.reason, OpenReason::TemperatureTrigger);
    assert_eq!(report.record.computer_position, Open);
    assert_eq!(report.record.open_reason, OpenReason::TemperatureTrigger);
    assert!(report.persisted);

    let report = rig.tick(inputs(21.0, sample(24.0, 700.0), 4.0));
    let decision = report.computer.unwrap();
    assert_eq!(decision.position, Closed);
    assert_eq!(decision.rule, Some("outdoor too cold"));
    assert_eq!(report.record.open_reason, OpenReason::Unknown);

    assert_eq!(rig.hw.drives(), vec![(ComputerRoom, Open), (ComputerRoom, Closed)]);
}

#[test]
fn high_co2_opens_with_co2_reason() {
    let mut rig = Rig::new();
    rig.auto(ComputerRoom);

    let report = rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));
    let decision = report.computer.unwrap();
    assert_eq!(decision.position, Open);
    assert_eq!(decision.reason, OpenReason::Co2Trigger);
    assert_eq!(report.record.open_reason, OpenReason::Co2Trigger);
    assert_eq!(report.record.computer_co2_ppm, Some(1200.0));
}

#[test]
fn holding_tick_records_unknown_reason() {
    let mut rig = Rig::new();
    rig.auto(ComputerRoom);
    rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));

    // Still above the close threshold: nothing moves.
    let report = rig.tick(inputs(21.0, sample(21.0, 900.0), 20.0));
    assert!(!report.computer.unwrap().changed);
    assert_eq!(report.record.computer_position, Open);
    assert_eq!(report.record.open_reason, OpenReason::Unknown);
    assert_eq!(rig.hw.drives().len(), 1);
}

#[test]
fn manual_rooms_are_not_evaluated() {
    let mut rig = Rig::new();
    let report = rig.tick(inputs(30.0, sample(30.0, 2000.0), 18.0));
    assert_eq!(report.doctor, None);
    assert_eq!(report.computer, None);
    assert!(rig.hw.drives().is_empty());

    // Readings are still cached for the history row.
    assert_eq!(report.record.doctor_temp_c, Some(30.0));
    assert_eq!(report.record.computer_co2_ppm, Some(2000.0));
}

// ── Input fallbacks ───────────────────────────────────────────

#[test]
fn missing_co2_sample_skips_only_the_computer_room() {
    let mut rig = Rig::new();
    rig.auto(DoctorRoom);
    rig.auto(ComputerRoom);

    let report = rig.tick(without_co2(inputs(25.0, sample(30.0, 2000.0), 18.0)));
    assert_eq!(report.computer, None);
    assert_eq!(report.doctor.unwrap().position, Open);
    assert_eq!(rig.app.room(ComputerRoom).position(), Closed);
    assert!(
        report
            .fallbacks
            .contains(&InputFallback::Co2Skipped(SensorError::SensorUnavailable))
    );
    assert_eq!(rig.hw.drives(), vec![(DoctorRoom, Open)]);
}

#[test]
fn doctor_sensor_failure_substitutes_twenty_degrees() {
    let mut rig = Rig::new();
    rig.auto(DoctorRoom);
    rig.tick(inputs(25.0, sample(21.0, 600.0), 18.0));
    assert_eq!(rig.app.room(DoctorRoom).position(), Open);

    // 20.0 is not below the 20.0 close threshold, so the window stays open.
    let report = rig.tick(without_doctor(inputs(25.0, sample(21.0, 600.0), 18.0)));
    let decision = report.doctor.unwrap();
    assert_eq!(decision.position, Open);
    assert!(!decision.changed);
    assert_eq!(report.record.doctor_temp_c, Some(20.0));
    assert!(report.fallbacks.contains(&InputFallback::DoctorTemperature {
        substituted_c: 20.0,
        cause: SensorError::ReadFailure,
    }));
}

#[test]
fn weather_failure_reuses_the_cached_outdoor_temperature() {
    let mut rig = Rig::new();
    rig.tick(inputs(21.0, sample(21.0, 600.0), 18.0));

    let report = rig.tick(without_weather(inputs(21.0, sample(21.0, 600.0), 99.0)));
    assert_eq!(rig.app.outside_temp_c(), Some(18.0));
    assert_eq!(report.record.outside_temp_c, Some(18.0));
    assert!(report.fallbacks.contains(&InputFallback::OutdoorCached {
        cached_c: Some(18.0),
        cause: NetworkError::Unreachable,
    }));
}

#[test]
fn unknown_outdoor_temperature_defers_every_decision() {
    let mut rig = Rig::new();
    rig.auto(DoctorRoom);
    rig.auto(ComputerRoom);

    let report = rig.tick(without_weather(inputs(30.0, sample(30.0, 2000.0), 0.0)));
    assert_eq!(report.doctor, None);
    assert_eq!(report.computer, None);
    assert!(rig.hw.drives().is_empty());
    assert_eq!(report.record.outside_temp_c, None);
    assert!(report.persisted);
}

// ── Actuation and history ordering ────────────────────────────

#[test]
fn actuation_precedes_the_history_append() {
    let mut rig = Rig::new();
    rig.auto(ComputerRoom);
    rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));

    let steps = rig.journal();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0], Step::Drive(ComputerRoom, Open));
    match steps[1] {
        Step::Append(row) => assert_eq!(row.computer_position, Open),
        other => panic!("expected append, got {:?}", other),
    }
}

#[test]
fn failed_actuation_keeps_position_and_is_not_retried() {
    let mut rig = Rig::new();
    rig.hw.fail_with = Some(ActuatorError::GpioWriteFailed);
    rig.auto(ComputerRoom);

    let report = rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));
    assert_eq!(report.record.computer_position, Open);
    let state = rig.app.room(ComputerRoom).state();
    assert_eq!(state.position, Open);
    assert_eq!(state.actuator_fault, Some(ActuatorError::GpioWriteFailed));
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ActuatorFault {
                room: ComputerRoom,
                ..
            }
        )),
        1
    );

    rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));
    assert_eq!(rig.hw.drives().len(), 1);
}

#[test]
fn history_failure_does_not_stop_the_tick() {
    let mut rig = Rig::new();
    rig.history.fail_with = Some(PersistenceError::Io(std::io::ErrorKind::PermissionDenied));
    rig.auto(ComputerRoom);

    let report = rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));
    assert!(!report.persisted);
    assert_eq!(rig.hw.drives(), vec![(ComputerRoom, Open)]);
    assert!(rig.sink.count(|e| matches!(e, AppEvent::PersistenceFault(_))) >= 1);
}

#[test]
fn every_tick_appends_one_row() {
    let mut rig = Rig::new();
    for _ in 0..3 {
        rig.tick(inputs(21.0, sample(21.0, 600.0), 18.0));
    }
    assert_eq!(rig.history.rows.len(), 3);
    assert_eq!(rig.app.tick_count(), 3);
}

// ── Manual commands ───────────────────────────────────────────

#[test]
fn repeated_manual_open_moves_once() {
    let mut rig = Rig::new();

    let first = rig.command(AppCommand::Open(DoctorRoom)).unwrap();
    assert_eq!(first.map(|t| t.to), Some(Open));
    assert_eq!(rig.command(AppCommand::Open(DoctorRoom)), Ok(None));

    assert_eq!(rig.hw.drives(), vec![(DoctorRoom, Open)]);
    assert_eq!(rig.history.rows.len(), 1);
    assert_eq!(rig.history.rows[0].doctor_position, Open);
    assert_eq!(rig.history.rows[0].open_reason, OpenReason::Unknown);
}

#[test]
fn manual_commands_are_refused_in_auto_mode() {
    let mut rig = Rig::new();
    rig.auto(DoctorRoom);

    assert_eq!(
        rig.command(AppCommand::Open(DoctorRoom)),
        Err(CommandRejected::AutoModeActive)
    );
    assert!(rig.hw.drives().is_empty());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CommandRejected { room: DoctorRoom, .. })),
        1
    );

    // The other room is unaffected.
    assert!(rig.command(AppCommand::Open(ComputerRoom)).unwrap().is_some());
}

#[test]
fn toggling_auto_mode_closes_an_open_window() {
    let mut rig = Rig::new();
    rig.command(AppCommand::Open(ComputerRoom)).unwrap();

    let closing = rig.command(AppCommand::ToggleAutoMode(ComputerRoom)).unwrap();
    assert_eq!(closing.map(|t| t.to), Some(Closed));
    assert!(rig.app.room(ComputerRoom).is_auto());
    assert_eq!(rig.hw.drives(), vec![(ComputerRoom, Open), (ComputerRoom, Closed)]);
    assert_eq!(rig.history.rows.last().unwrap().computer_position, Closed);

    // Window already closed: leaving auto mode moves nothing.
    assert_eq!(rig.command(AppCommand::ToggleAutoMode(ComputerRoom)), Ok(None));
    assert!(!rig.app.room(ComputerRoom).is_auto());
    assert_eq!(rig.hw.drives().len(), 2);
}

#[test]
fn leaving_auto_mode_closes_a_window_the_rules_opened() {
    let mut rig = Rig::new();
    rig.auto(ComputerRoom);
    rig.tick(inputs(21.0, sample(21.0, 1200.0), 20.0));

    let closing = rig.command(AppCommand::ToggleAutoMode(ComputerRoom)).unwrap();
    assert_eq!(closing.map(|t| t.from), Some(Open));
    assert_eq!(rig.app.room(ComputerRoom).position(), Closed);
}

#[test]
fn status_reports_both_rooms() {
    let mut rig = Rig::new();
    rig.tick(inputs(21.5, sample(22.0, 640.0), 12.0));
    rig.command(AppCommand::ReportStatus).unwrap();

    match rig.sink.events.last() {
        Some(AppEvent::Status(report)) => {
            assert_eq!(report.outside_temp_c, Some(12.0));
            assert_eq!(report.doctor.indoor_temp_c, Some(21.5));
            assert_eq!(report.computer.co2_ppm, Some(640.0));
        }
        other => panic!("expected status, got {:?}", other),
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn restore_seeds_positions_but_not_auto_mode() {
    let j = journal();
    let last = HistoryRecord {
        outside_temp_c: Some(16.0),
        doctor_temp_c: Some(24.0),
        doctor_position: Open,
        computer_temp_c: Some(21.0),
        computer_co2_ppm: Some(700.0),
        computer_position: Closed,
        open_reason: OpenReason::Unknown,
    };
    let history = MemoryHistory::with_rows(j.clone(), vec![last]);
    let mut sink = RecordingSink::new();
    let mut app = ControlLoop::new(SystemConfig::default());

    app.restore(&history, &mut sink);
    assert_eq!(app.room(DoctorRoom).position(), Open);
    assert_eq!(app.room(ComputerRoom).position(), Closed);
    assert!(!app.room(DoctorRoom).is_auto());
    assert!(!app.room(ComputerRoom).is_auto());
    assert_eq!(
        sink.events,
        vec![AppEvent::Restored {
            doctor: Open,
            computer: Closed,
        }]
    );
}

#[test]
fn unreadable_history_starts_closed() {
    let j = journal();
    let mut history = MemoryHistory::new(j);
    history.fail_with = Some(PersistenceError::Format);
    let mut sink = RecordingSink::new();
    let mut app = ControlLoop::new(SystemConfig::default());

    app.restore(&history, &mut sink);
    assert_eq!(app.room(DoctorRoom).position(), Closed);
    assert_eq!(
        sink.events,
        vec![AppEvent::PersistenceFault(PersistenceError::Format)]
    );
}

#[test]
fn start_and_shutdown_release_every_relay() {
    let mut rig = Rig::new();
    rig.app.start(&mut rig.hw, &mut rig.sink);
    rig.app.shutdown(&mut rig.hw);
    assert_eq!(rig.journal(), vec![Step::ReleaseAll, Step::ReleaseAll]);
    assert_eq!(
        rig.sink.events,
        vec![AppEvent::Started {
            tick_interval_secs: 60
        }]
    );
}

// ── Simulated devices end to end ──────────────────────────────

#[test]
fn tick_reads_simulated_devices() {
    let env = SimEnvironment::default();
    env.apply(SimCommand::Co2(1200.0));
    env.apply(SimCommand::ComputerTemperature(21.0));
    env.apply(SimCommand::Outdoor(20.0));

    let mut config = SystemConfig::default();
    config.sampling.ready_poll_interval_ms = 1;
    let mut gatherer = InputGatherer::new(
        SimCo2Sensor::new(env.clone()),
        SimClimateSensor::new(env.clone()),
        SimWeather::new(env.clone()),
        &config,
    )
    .unwrap();

    let mut rig = Rig::new();
    rig.auto(ComputerRoom);
    let report = block_on(rig.app.tick(
        &mut gatherer,
        &mut rig.hw,
        &mut rig.history,
        &mut rig.sink,
    ));

    assert!(report.fallbacks.is_empty());
    assert_eq!(report.record.outside_temp_c, Some(20.0));
    assert_eq!(report.record.open_reason, OpenReason::Co2Trigger);
    let co2 = report.record.computer_co2_ppm.unwrap();
    assert!((co2 - 1200.0).abs() <= 5.0, "warm-up reading leaked: {co2}");
}
