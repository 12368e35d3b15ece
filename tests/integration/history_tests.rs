//! The control loop writing through the real CSV store, across a restart.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use futures_lite::future::block_on;

use crate::mock_hw::{MockActuator, RecordingSink, inputs, journal, sample};
use roomvent::app::commands::AppCommand;
use roomvent::app::ports::HistorySink;
use roomvent::app::service::ControlLoop;
use roomvent::config::SystemConfig;
use roomvent::control::{OpenReason, RoomId, WindowPosition};
use roomvent::history::CsvHistoryStore;

const TWO_WEEKS: Duration = Duration::from_secs(14 * 24 * 60 * 60);

fn scratch(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "roomvent-it-{}-{}.csv",
        tag,
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn positions_survive_a_restart() {
    let path = scratch("restart");
    let mut hw = MockActuator::new(journal());
    let mut sink = RecordingSink::new();

    {
        let mut store = CsvHistoryStore::new(&path, TWO_WEEKS);
        let mut app = ControlLoop::new(SystemConfig::default());
        app.restore(&store, &mut sink);

        block_on(app.handle_command(
            AppCommand::ToggleAutoMode(RoomId::ComputerRoom),
            &mut hw,
            &mut store,
            &mut sink,
        ))
        .unwrap();
        let report = block_on(app.apply(
            inputs(21.0, sample(21.0, 1200.0), 20.0),
            &mut hw,
            &mut store,
            &mut sink,
        ));
        assert!(report.persisted);
    }

    let store = CsvHistoryStore::new(&path, TWO_WEEKS);
    let last = store.load_last_record().unwrap().unwrap();
    assert_eq!(last.computer_position, WindowPosition::Open);
    assert_eq!(last.open_reason, OpenReason::Co2Trigger);

    let mut app = ControlLoop::new(SystemConfig::default());
    app.restore(&store, &mut sink);
    assert_eq!(app.room(RoomId::ComputerRoom).position(), WindowPosition::Open);
    assert_eq!(app.room(RoomId::DoctorRoom).position(), WindowPosition::Closed);
    assert!(!app.room(RoomId::ComputerRoom).is_auto());

    let _ = fs::remove_file(&path);
}

#[test]
fn file_has_one_header_and_one_row_per_tick() {
    let path = scratch("rows");
    let mut store = CsvHistoryStore::new(&path, TWO_WEEKS);
    let mut hw = MockActuator::new(journal());
    let mut sink = RecordingSink::new();
    let mut app = ControlLoop::new(SystemConfig::default());

    for outside in [18.0, 17.5, 17.0] {
        block_on(app.apply(
            inputs(21.0, sample(22.0, 700.0), outside),
            &mut hw,
            &mut store,
            &mut sink,
        ));
    }

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("temp_outside,"));
    assert_eq!(lines[3], "17.0,21.0,0,22.0,700.0,0,0");

    let _ = fs::remove_file(&path);
}
