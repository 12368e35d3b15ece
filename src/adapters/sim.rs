//! Simulated hardware for host runs.
//!
//! One shared [`SimState`] backs every simulated device: relay pins, the
//! CO2 sensor, the DHT22 and the weather service.  The console adapter
//! adjusts it at run time (`sim outdoor 4`, `sim fail co2 on`, ...) so
//! every fallback path can be exercised without hardware.
//!
//! The state sits behind an `embassy_sync` blocking mutex because the
//! console thread writes it while the executor thread reads it.

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{self, ErrorType, OutputPin};
use log::{debug, info};

use crate::app::ports::WeatherProvider;
use crate::error::{NetworkError, SensorError};
use crate::sensors::{ClimateReading, ClimateSensor, Co2Sensor, SensorSample};

/// Simulated weather lookup latency.
const WEATHER_LATENCY: Duration = Duration::from_millis(50);

/// Readings reported by the very first single shot after a handshake.
const WARM_UP_GARBAGE: SensorSample = SensorSample {
    co2_ppm: 0.0,
    temperature_c: -45.0,
    humidity_pct: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub outdoor_c: f64,
    pub doctor_c: f64,
    pub computer_c: f64,
    pub co2_ppm: f64,
    pub humidity_pct: f64,
    pub co2_offline: bool,
    pub dht_offline: bool,
    pub weather_offline: bool,
    pub relays_stuck: bool,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            outdoor_c: 17.0,
            doctor_c: 22.0,
            computer_c: 22.5,
            co2_ppm: 850.0,
            humidity_pct: 45.0,
            co2_offline: false,
            dht_offline: false,
            weather_offline: false,
            relays_stuck: false,
        }
    }
}

/// Failure switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    Co2,
    Dht,
    Weather,
    Relays,
}

/// Run-time adjustment of the simulated world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    Outdoor(f64),
    DoctorTemperature(f64),
    ComputerTemperature(f64),
    Co2(f64),
    Fail(SimFault, bool),
}

/// Cloneable handle to the shared simulated world.
#[derive(Clone)]
pub struct SimEnvironment {
    state: Arc<Mutex<CriticalSectionRawMutex, RefCell<SimState>>>,
}

impl SimEnvironment {
    pub fn new(initial: SimState) -> Self {
        Self {
            state: Arc::new(Mutex::new(RefCell::new(initial))),
        }
    }

    pub fn snapshot(&self) -> SimState {
        self.state.lock(|s| *s.borrow())
    }

    pub fn update(&self, f: impl FnOnce(&mut SimState)) {
        self.state.lock(|s| f(&mut s.borrow_mut()));
    }

    pub fn apply(&self, cmd: SimCommand) {
        self.update(|s| match cmd {
            SimCommand::Outdoor(t) => s.outdoor_c = t,
            SimCommand::DoctorTemperature(t) => s.doctor_c = t,
            SimCommand::ComputerTemperature(t) => s.computer_c = t,
            SimCommand::Co2(ppm) => s.co2_ppm = ppm,
            SimCommand::Fail(SimFault::Co2, on) => s.co2_offline = on,
            SimCommand::Fail(SimFault::Dht, on) => s.dht_offline = on,
            SimCommand::Fail(SimFault::Weather, on) => s.weather_offline = on,
            SimCommand::Fail(SimFault::Relays, on) => s.relays_stuck = on,
        });
        info!("sim: {:?}", cmd);
    }
}

impl Default for SimEnvironment {
    fn default() -> Self {
        Self::new(SimState::default())
    }
}

// ── Relay pins ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl digital::Error for SimPinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Output pin that logs its level and fails while relays are stuck.
pub struct SimPin {
    gpio: u8,
    high: bool,
    env: SimEnvironment,
}

impl SimPin {
    pub fn new(gpio: u8, env: SimEnvironment) -> Self {
        Self {
            gpio,
            high: true,
            env,
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    fn set(&mut self, high: bool) -> Result<(), SimPinError> {
        if self.env.snapshot().relays_stuck {
            return Err(SimPinError);
        }
        self.high = high;
        debug!("sim: GPIO{} {}", self.gpio, if high { "HIGH" } else { "LOW" });
        Ok(())
    }
}

impl ErrorType for SimPin {
    type Error = SimPinError;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}

// ── CO2 sensor ───────────────────────────────────────────────

pub struct SimCo2Sensor {
    env: SimEnvironment,
    shots_since_begin: u32,
    pending: bool,
}

impl SimCo2Sensor {
    pub fn new(env: SimEnvironment) -> Self {
        Self {
            env,
            shots_since_begin: 0,
            pending: false,
        }
    }

    fn online(&self) -> Result<(), SensorError> {
        if self.env.snapshot().co2_offline {
            Err(SensorError::SensorUnavailable)
        } else {
            Ok(())
        }
    }
}

impl Co2Sensor for SimCo2Sensor {
    async fn begin(&mut self) -> Result<(), SensorError> {
        self.online()?;
        self.shots_since_begin = 0;
        Ok(())
    }

    async fn stop_periodic_measurement(&mut self) -> Result<(), SensorError> {
        self.online()
    }

    async fn self_test(&mut self) -> Result<bool, SensorError> {
        self.online().map(|()| true)
    }

    async fn wake_up(&mut self) -> Result<(), SensorError> {
        self.online()
    }

    async fn request_single_shot(&mut self) -> Result<(), SensorError> {
        self.online()?;
        self.pending = true;
        Ok(())
    }

    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        self.online()?;
        Ok(self.pending)
    }

    async fn read_measurement(&mut self) -> Result<SensorSample, SensorError> {
        self.online()?;
        self.pending = false;
        self.shots_since_begin += 1;
        if self.shots_since_begin == 1 {
            return Ok(WARM_UP_GARBAGE);
        }

        let s = self.env.snapshot();
        // Deterministic +-5 ppm / +-0.1 C wobble around the set point.
        let wobble = f64::from(self.shots_since_begin % 3) - 1.0;
        Ok(SensorSample {
            co2_ppm: s.co2_ppm + 5.0 * wobble,
            temperature_c: s.computer_c + 0.1 * wobble,
            humidity_pct: s.humidity_pct,
        })
    }
}

// ── DHT22 ────────────────────────────────────────────────────

pub struct SimClimateSensor {
    env: SimEnvironment,
}

impl SimClimateSensor {
    pub fn new(env: SimEnvironment) -> Self {
        Self { env }
    }
}

impl ClimateSensor for SimClimateSensor {
    async fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let s = self.env.snapshot();
        if s.dht_offline {
            return Err(SensorError::ReadFailure);
        }
        Ok(ClimateReading {
            humidity_pct: s.humidity_pct,
            temperature_c: s.doctor_c,
        })
    }
}

// ── Weather ──────────────────────────────────────────────────

pub struct SimWeather {
    env: SimEnvironment,
}

impl SimWeather {
    pub fn new(env: SimEnvironment) -> Self {
        Self { env }
    }
}

impl WeatherProvider for SimWeather {
    async fn current_outdoor_temperature(&mut self, location: &str) -> Result<f64, NetworkError> {
        Timer::after(WEATHER_LATENCY).await;
        let s = self.env.snapshot();
        if s.weather_offline {
            return Err(NetworkError::Unreachable);
        }
        debug!("sim: weather for {location}: {:.1} C", s.outdoor_c);
        Ok(s.outdoor_c)
    }
}
