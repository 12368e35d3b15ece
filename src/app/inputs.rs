//! Per-tick input acquisition.
//!
//! Reading the CO2 burst, the DHT22 and the weather service can take
//! several seconds.  [`InputGatherer`] does all of it up front and hands
//! the raw outcomes to the control loop, so the room state is only locked
//! for the short decide → actuate → record phase.  Failures are carried
//! as values; the fallback policy lives in
//! [`ControlLoop::apply`](super::service::ControlLoop::apply).

use log::debug;

use crate::config::SystemConfig;
use crate::error::{NetworkError, SensorError};
use crate::sensors::{ClimateSensor, Co2Sensor, SampleAggregator, SensorSample};

use super::ports::{ConfigError, WeatherProvider};

/// Raw outcome of one round of input reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInputs {
    /// Averaged computer-room sample.
    pub co2: Result<SensorSample, SensorError>,
    /// Doctor-room temperature (Celsius).
    pub doctor_temp_c: Result<f64, SensorError>,
    /// Outdoor temperature (Celsius).
    pub outside_temp_c: Result<f64, NetworkError>,
}

pub struct InputGatherer<C, D, W> {
    co2_sensor: C,
    climate_sensor: D,
    weather: W,
    aggregator: SampleAggregator,
    location: String,
}

impl<C, D, W> InputGatherer<C, D, W>
where
    C: Co2Sensor,
    D: ClimateSensor,
    W: WeatherProvider,
{
    pub fn new(
        co2_sensor: C,
        climate_sensor: D,
        weather: W,
        config: &SystemConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            co2_sensor,
            climate_sensor,
            weather,
            aggregator: SampleAggregator::new(config.sampling)?,
            location: config.weather_location.clone(),
        })
    }

    /// Read every input once.  Never fails; each outcome is reported.
    pub async fn gather(&mut self) -> TickInputs {
        let co2 = self.aggregator.sample(&mut self.co2_sensor).await;
        let doctor_temp_c = self
            .climate_sensor
            .read()
            .await
            .map(|reading| reading.temperature_c);
        let outside_temp_c = self
            .weather
            .current_outdoor_temperature(&self.location)
            .await;

        debug!(
            "inputs: co2={:?} doctor={:?} outside={:?}",
            co2, doctor_temp_c, outside_temp_c
        );
        TickInputs {
            co2,
            doctor_temp_c,
            outside_temp_c,
        }
    }
}
