//! Tick log: one CSV row per control-loop tick.
//!
//! The file keeps the column names the dashboard scripts read:
//!
//! ```text
//! temp_outside,temp_first_room,window_position_first_room,temp_second_room,co2,window_position_second_room,why_open
//! 17.5,21.3,0,22.8,912.4,1,2
//! ```
//!
//! Missing measurements are written as empty fields.  Retention is
//! wholesale: once the file has not been modified for the retention
//! window it is truncated to zero bytes, and the next append starts it
//! again with a header.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::HistorySink;
use crate::config::HistoryConfig;
use crate::control::{OpenReason, RoomState, WindowPosition};
use crate::error::PersistenceError;

/// One logged tick.  Row order in the file is the only timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "temp_outside")]
    pub outside_temp_c: Option<f64>,
    #[serde(rename = "temp_first_room")]
    pub doctor_temp_c: Option<f64>,
    #[serde(rename = "window_position_first_room")]
    pub doctor_position: WindowPosition,
    #[serde(rename = "temp_second_room")]
    pub computer_temp_c: Option<f64>,
    #[serde(rename = "co2")]
    pub computer_co2_ppm: Option<f64>,
    #[serde(rename = "window_position_second_room")]
    pub computer_position: WindowPosition,
    #[serde(rename = "why_open")]
    pub open_reason: OpenReason,
}

impl HistoryRecord {
    /// Row describing both rooms as they are now.
    pub fn snapshot(
        outside_temp_c: Option<f64>,
        doctor: &RoomState,
        computer: &RoomState,
        open_reason: OpenReason,
    ) -> Self {
        Self {
            outside_temp_c,
            doctor_temp_c: doctor.indoor_temp_c,
            doctor_position: doctor.position,
            computer_temp_c: computer.indoor_temp_c,
            computer_co2_ppm: computer.co2_ppm,
            computer_position: computer.position,
            open_reason,
        }
    }
}

/// File-backed [`HistorySink`].
pub struct CsvHistoryStore {
    path: PathBuf,
    retention: Duration,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            path: path.into(),
            retention,
        }
    }

    pub fn from_config(cfg: &HistoryConfig) -> Self {
        Self::new(&cfg.path, Duration::from_secs(cfg.retention_secs))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_stale(&self, now: SystemTime) -> Result<bool, PersistenceError> {
        let modified = match fs::metadata(&self.path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        // A timestamp in the future counts as fresh.
        Ok(now
            .duration_since(modified)
            .is_ok_and(|age| age > self.retention))
    }
}

impl HistorySink for CsvHistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), PersistenceError> {
        self.truncate_if_stale(SystemTime::now())?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        debug!("history: appended {:?}", record);
        Ok(())
    }

    fn truncate_if_stale(&mut self, now: SystemTime) -> Result<bool, PersistenceError> {
        if !self.is_stale(now)? {
            return Ok(false);
        }
        File::create(&self.path)?;
        info!(
            "history: {} older than {} days, cleared",
            self.path.display(),
            self.retention.as_secs() / 86_400
        );
        Ok(true)
    }

    fn load_last_record(&self) -> Result<Option<HistoryRecord>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let mut last = None;
        for row in reader.deserialize() {
            last = Some(row?);
        }
        Ok(last)
    }
}
