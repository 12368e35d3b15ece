//! Burst sampling of the CO2 sensor.
//!
//! ```text
//!   begin ─┬─ ok ──▶ stop periodic ──▶ self test ─┬─ ok ─────────┐
//!          └─ err ─▶ wait, retry (bounded)        └─ fail ─▶ wake ┤
//!                                                                 ▼
//!   repeat N times: single shot ──▶ poll ready (bounded) ──▶ read
//!   drop the first `discarded` readings, average the rest per field
//! ```
//!
//! The first reading after a single-shot wake-up is documented as invalid
//! by the sensor datasheet, so it never contributes to the mean.

use embassy_time::{Duration, Timer, with_timeout};
use heapless::Vec;
use log::{debug, warn};

use super::{Co2Sensor, SensorSample};
use crate::app::ports::ConfigError;
use crate::config::SamplingConfig;
use crate::error::SensorError;

/// Upper bound on readings per burst.
pub const MAX_READINGS: usize = 16;

pub struct SampleAggregator {
    cfg: SamplingConfig,
}

impl SampleAggregator {
    /// Fails when the burst shape cannot be honoured as configured.
    pub fn new(cfg: SamplingConfig) -> Result<Self, ConfigError> {
        check_config(&cfg)?;
        Ok(Self { cfg })
    }

    /// Run one burst and return the averaged sample.
    ///
    /// Fails with [`SensorError::SensorUnavailable`] when the handshake
    /// never succeeds or a reading never becomes ready; the caller decides
    /// what to do without a sample.
    pub async fn sample<S: Co2Sensor>(&self, sensor: &mut S) -> Result<SensorSample, SensorError> {
        self.initialise(sensor).await?;

        let total = self.cfg.readings_per_sample as usize;
        let discard = self.cfg.discarded_readings as usize;
        let mut kept: Vec<SensorSample, MAX_READINGS> = Vec::new();

        for index in 0..total {
            let reading = self.single_shot(sensor).await?;
            if index < discard {
                debug!("co2: discarding warm-up reading {:?}", reading);
                continue;
            }
            if kept.push(reading).is_err() {
                return Err(SensorError::SensorUnavailable);
            }
        }

        average(&kept).ok_or(SensorError::SensorUnavailable)
    }

    async fn initialise<S: Co2Sensor>(&self, sensor: &mut S) -> Result<(), SensorError> {
        let attempts = self.cfg.begin_attempts;
        let mut attempt = 1;
        loop {
            match sensor.begin().await {
                Ok(()) => break,
                Err(e) if attempt < attempts => {
                    warn!("co2: handshake attempt {attempt}/{attempts} failed ({e}), retrying");
                    attempt += 1;
                    Timer::after(Duration::from_millis(self.cfg.begin_retry_interval_ms.into()))
                        .await;
                }
                Err(e) => {
                    warn!("co2: handshake failed after {attempts} attempts ({e})");
                    return Err(SensorError::SensorUnavailable);
                }
            }
        }

        sensor.stop_periodic_measurement().await?;
        if !sensor.self_test().await? {
            debug!("co2: self test reported a problem, waking sensor");
            sensor.wake_up().await?;
        }
        Ok(())
    }

    async fn single_shot<S: Co2Sensor>(&self, sensor: &mut S) -> Result<SensorSample, SensorError> {
        sensor.request_single_shot().await?;

        let poll = Duration::from_millis(self.cfg.ready_poll_interval_ms.into());
        let wait_ready = async {
            loop {
                if sensor.data_ready().await? {
                    return Ok::<(), SensorError>(());
                }
                Timer::after(poll).await;
            }
        };

        let timeout = Duration::from_millis(self.cfg.ready_timeout_ms.into());
        match with_timeout(timeout, wait_ready).await {
            Ok(ready) => ready?,
            Err(_) => {
                warn!("co2: no data after {} ms", self.cfg.ready_timeout_ms);
                return Err(SensorError::SensorUnavailable);
            }
        }

        sensor.read_measurement().await
    }
}

/// Range checks for a burst configuration.
pub fn check_config(s: &SamplingConfig) -> Result<(), ConfigError> {
    if s.readings_per_sample as usize > MAX_READINGS {
        return Err(ConfigError::ValidationFailed("readings_per_sample must be <= 16"));
    }
    if s.discarded_readings >= s.readings_per_sample {
        return Err(ConfigError::ValidationFailed(
            "discarded_readings must be < readings_per_sample",
        ));
    }
    if s.ready_poll_interval_ms == 0 || s.ready_poll_interval_ms >= s.ready_timeout_ms {
        return Err(ConfigError::ValidationFailed(
            "ready_poll_interval_ms must be > 0 and < ready_timeout_ms",
        ));
    }
    if s.begin_attempts == 0 {
        return Err(ConfigError::ValidationFailed("begin_attempts must be > 0"));
    }
    Ok(())
}

/// Arithmetic mean per field; `None` for an empty slice.
pub fn average(readings: &[SensorSample]) -> Option<SensorSample> {
    if readings.is_empty() {
        return None;
    }
    let n = readings.len() as f64;
    let sum = readings.iter().fold(SensorSample::default(), |acc, r| SensorSample {
        co2_ppm: acc.co2_ppm + r.co2_ppm,
        temperature_c: acc.temperature_c + r.temperature_c,
        humidity_pct: acc.humidity_pct + r.humidity_pct,
    });
    Some(SensorSample {
        co2_ppm: sum.co2_ppm / n,
        temperature_c: sum.temperature_c / n,
        humidity_pct: sum.humidity_pct / n,
    })
}
