//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON document.  Every
//! field is range-checked on load and before saving; an out-of-range file
//! is rejected rather than clamped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{RoomLimits, SystemConfig};
use crate::sensors::aggregator;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("config: reading {} failed: {e}", self.path.display());
                return Err(ConfigError::IoError);
            }
        };

        let cfg: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("config: {} is not valid: {e}", self.path.display());
            ConfigError::Corrupted
        })?;
        validate_config(&cfg)?;
        info!("config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, json).map_err(|e| {
            warn!("config: writing {} failed: {e}", self.path.display());
            ConfigError::IoError
        })?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}

// Negated comparisons also reject NaN.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn validate_room(limits: &RoomLimits, name: &'static str) -> Result<(), ConfigError> {
    if !(limits.min_temperature_c < limits.max_temperature_c) {
        return Err(ConfigError::ValidationFailed(name));
    }
    if !(limits.min_temperature_differential_c > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "min_temperature_differential_c must be > 0",
        ));
    }
    if !limits.min_outside_temperature_c.is_finite() {
        return Err(ConfigError::ValidationFailed(
            "min_outside_temperature_c must be finite",
        ));
    }
    if let Some(co2) = limits.co2 {
        if !(co2.min_ppm > 0.0 && co2.min_ppm < co2.max_ppm) {
            return Err(ConfigError::ValidationFailed(
                "co2 thresholds must satisfy 0 < min_ppm < max_ppm",
            ));
        }
    }
    Ok(())
}

pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    validate_room(
        &cfg.doctor_room,
        "doctor_room: min_temperature_c must be < max_temperature_c",
    )?;
    validate_room(
        &cfg.computer_room,
        "computer_room: min_temperature_c must be < max_temperature_c",
    )?;
    if cfg.tick_interval_secs == 0 {
        return Err(ConfigError::ValidationFailed("tick_interval_secs must be > 0"));
    }
    if !cfg.doctor_fallback_temperature_c.is_finite() {
        return Err(ConfigError::ValidationFailed(
            "doctor_fallback_temperature_c must be finite",
        ));
    }
    if cfg.weather_location.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("weather_location must not be empty"));
    }

    aggregator::check_config(&cfg.sampling)?;

    let w = &cfg.window;
    if w.opening_time_ms == 0 || w.closing_time_ms < w.opening_time_ms {
        return Err(ConfigError::ValidationFailed(
            "window times must be > 0 with closing_time_ms >= opening_time_ms",
        ));
    }

    if cfg.history.retention_secs == 0 {
        return Err(ConfigError::ValidationFailed("retention_secs must be > 0"));
    }
    if cfg.history.path.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("history path must not be empty"));
    }
    Ok(())
}
