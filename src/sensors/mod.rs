//! Sensor capabilities and the CO2 burst aggregator.
//!
//! Two instruments feed the control loop:
//!
//! * the computer room's SCD4x-style CO2 sensor ([`Co2Sensor`]), read in
//!   single-shot bursts that [`SampleAggregator`] folds into one sample;
//! * the doctor's office DHT22 ([`ClimateSensor`]), read once per tick.
//!
//! Drivers implement the traits; nothing here knows about buses or pins.

pub mod aggregator;

use core::future::Future;

use crate::error::SensorError;

pub use aggregator::{SampleAggregator, average};

/// One CO2-sensor reading, or the mean of several.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSample {
    pub co2_ppm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// DHT22 output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub humidity_pct: f64,
    pub temperature_c: f64,
}

/// Single-shot CO2 / temperature / humidity sensor.
///
/// Every call may suspend on bus I/O.  A device that does not answer
/// reports [`SensorError::SensorUnavailable`].
pub trait Co2Sensor {
    /// Initialisation handshake.
    fn begin(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Leave periodic mode so single-shot requests are accepted.
    fn stop_periodic_measurement(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Built-in self test; `true` when the device reports no malfunction.
    fn self_test(&mut self) -> impl Future<Output = Result<bool, SensorError>>;

    /// Wake from sleep mode.
    fn wake_up(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Trigger one measurement.
    fn request_single_shot(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Whether the triggered measurement can be read.
    fn data_ready(&mut self) -> impl Future<Output = Result<bool, SensorError>>;

    /// Read the measurement triggered last.
    fn read_measurement(&mut self) -> impl Future<Output = Result<SensorSample, SensorError>>;
}

/// Temperature / humidity sensor without a CO2 channel.
pub trait ClimateSensor {
    /// Fails with [`SensorError::ReadFailure`] when the sensor returns no data.
    fn read(&mut self) -> impl Future<Output = Result<ClimateReading, SensorError>>;
}
