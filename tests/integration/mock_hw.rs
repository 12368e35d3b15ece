//! Mock adapters for integration tests.
//!
//! The actuator and the history sink share one [`Journal`] so tests can
//! assert on the relative order of window movements and history appends
//! without touching real relays or files.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;

use roomvent::app::events::AppEvent;
use roomvent::app::inputs::TickInputs;
use roomvent::app::ports::{ActuatorPort, EventSink, HistorySink};
use roomvent::control::{RoomId, WindowPosition};
use roomvent::error::{ActuatorError, NetworkError, PersistenceError, SensorError};
use roomvent::history::HistoryRecord;
use roomvent::sensors::SensorSample;

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Drive(RoomId, WindowPosition),
    ReleaseAll,
    Append(HistoryRecord),
}

pub type Journal = Rc<RefCell<Vec<Step>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

// ── MockActuator ──────────────────────────────────────────────

pub struct MockActuator {
    pub journal: Journal,
    /// When set, every drive fails with this error after being recorded.
    pub fail_with: Option<ActuatorError>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_with: None,
        }
    }

    pub fn drives(&self) -> Vec<(RoomId, WindowPosition)> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Step::Drive(room, to) => Some((*room, *to)),
                _ => None,
            })
            .collect()
    }

    fn drive(&mut self, room: RoomId, to: WindowPosition) -> Result<(), ActuatorError> {
        self.journal.borrow_mut().push(Step::Drive(room, to));
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ActuatorPort for MockActuator {
    async fn open(&mut self, room: RoomId) -> Result<(), ActuatorError> {
        self.drive(room, WindowPosition::Open)
    }

    async fn close(&mut self, room: RoomId) -> Result<(), ActuatorError> {
        self.drive(room, WindowPosition::Closed)
    }

    fn release_all(&mut self) -> Result<(), ActuatorError> {
        self.journal.borrow_mut().push(Step::ReleaseAll);
        Ok(())
    }
}

// ── MemoryHistory ─────────────────────────────────────────────

pub struct MemoryHistory {
    pub journal: Journal,
    pub rows: Vec<HistoryRecord>,
    /// When set, appends fail with this error and nothing is stored.
    pub fail_with: Option<PersistenceError>,
}

#[allow(dead_code)]
impl MemoryHistory {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            rows: Vec::new(),
            fail_with: None,
        }
    }

    pub fn with_rows(journal: Journal, rows: Vec<HistoryRecord>) -> Self {
        Self {
            rows,
            ..Self::new(journal)
        }
    }
}

impl HistorySink for MemoryHistory {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), PersistenceError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.journal.borrow_mut().push(Step::Append(*record));
        self.rows.push(*record);
        Ok(())
    }

    fn truncate_if_stale(&mut self, _now: SystemTime) -> Result<bool, PersistenceError> {
        Ok(false)
    }

    fn load_last_record(&self) -> Result<Option<HistoryRecord>, PersistenceError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        Ok(self.rows.last().copied())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted inputs ───────────────────────────────────────────

/// Computer-room sample with the given temperature and CO2.
pub fn sample(temperature_c: f64, co2_ppm: f64) -> SensorSample {
    SensorSample {
        co2_ppm,
        temperature_c,
        humidity_pct: 40.0,
    }
}

/// All three inputs present.
pub fn inputs(doctor_c: f64, computer: SensorSample, outside_c: f64) -> TickInputs {
    TickInputs {
        co2: Ok(computer),
        doctor_temp_c: Ok(doctor_c),
        outside_temp_c: Ok(outside_c),
    }
}

#[allow(dead_code)]
pub fn without_co2(mut i: TickInputs) -> TickInputs {
    i.co2 = Err(SensorError::SensorUnavailable);
    i
}

#[allow(dead_code)]
pub fn without_doctor(mut i: TickInputs) -> TickInputs {
    i.doctor_temp_c = Err(SensorError::ReadFailure);
    i
}

#[allow(dead_code)]
pub fn without_weather(mut i: TickInputs) -> TickInputs {
    i.outside_temp_c = Err(NetworkError::Unreachable);
    i
}
