//! System configuration parameters
//!
//! All tunable parameters for the ventilation controller.  The struct is
//! built once at start-up (defaults, optionally overridden by a JSON file)
//! and handed to the control loop by value; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::control::RoomId;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Limits for the doctor's office (temperature only).
    pub doctor_room: RoomLimits,
    /// Limits for the computer room (temperature and CO2).
    pub computer_room: RoomLimits,

    /// Control loop period (seconds).
    pub tick_interval_secs: u32,
    /// Substituted when the doctor-room sensor cannot be read (Celsius).
    pub doctor_fallback_temperature_c: f64,
    /// Location string passed to the weather provider.
    pub weather_location: String,

    pub sampling: SamplingConfig,
    pub window: WindowTiming,
    pub history: HistoryConfig,
}

/// Hysteresis thresholds for one room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomLimits {
    /// Open above this indoor temperature.
    pub max_temperature_c: f64,
    /// Close below this indoor temperature.
    pub min_temperature_c: f64,
    /// Never keep the window open below this outdoor temperature.
    pub min_outside_temperature_c: f64,
    /// Indoor minus outdoor temperature needed for venting to help.
    pub min_temperature_differential_c: f64,
    /// CO2 channel, only for rooms with a CO2 sensor.
    pub co2: Option<Co2Limits>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Co2Limits {
    /// Open above this concentration.
    pub max_ppm: f64,
    /// Close below this concentration.
    pub min_ppm: f64,
}

/// CO2 sensor burst parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Single-shot readings per sample, including the discarded ones.
    pub readings_per_sample: u8,
    /// Leading readings dropped (datasheet warm-up artefact).
    pub discarded_readings: u8,
    /// Data-ready poll interval (milliseconds).
    pub ready_poll_interval_ms: u32,
    /// Upper bound on waiting for one reading (milliseconds).
    pub ready_timeout_ms: u32,
    /// Handshake attempts before the sensor is declared unavailable.
    pub begin_attempts: u8,
    /// Pause between handshake attempts (milliseconds).
    pub begin_retry_interval_ms: u32,
}

/// Relay drive durations.  Closing runs longer so the window always seats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowTiming {
    pub opening_time_ms: u32,
    pub closing_time_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// CSV file the tick log is appended to.
    pub path: String,
    /// Wipe the log when it has not been written for this long (seconds).
    pub retention_secs: u64,
}

impl SystemConfig {
    pub fn limits(&self, room: RoomId) -> &RoomLimits {
        match room {
            RoomId::DoctorRoom => &self.doctor_room,
            RoomId::ComputerRoom => &self.computer_room,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            doctor_room: RoomLimits {
                max_temperature_c: 23.0,
                min_temperature_c: 20.0,
                min_outside_temperature_c: 15.0,
                min_temperature_differential_c: 2.0,
                co2: None,
            },
            computer_room: RoomLimits {
                max_temperature_c: 23.0,
                min_temperature_c: 20.0,
                min_outside_temperature_c: 5.0,
                min_temperature_differential_c: 2.0,
                co2: Some(Co2Limits {
                    max_ppm: 1000.0,
                    min_ppm: 800.0,
                }),
            },

            tick_interval_secs: 60,
            doctor_fallback_temperature_c: 20.0,
            weather_location: "Gliwice,PL".into(),

            sampling: SamplingConfig {
                readings_per_sample: 6,
                discarded_readings: 1,
                ready_poll_interval_ms: 100,
                ready_timeout_ms: 10_000,
                begin_attempts: 5,
                begin_retry_interval_ms: 3_000,
            },
            window: WindowTiming {
                opening_time_ms: 9_000,
                closing_time_ms: 10_500,
            },
            history: HistoryConfig {
                path: "data.csv".into(),
                retention_secs: 14 * 24 * 60 * 60, // 2 weeks
            },
        }
    }
}
