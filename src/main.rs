//! RoomVent: Main Entry Point
//!
//! Hexagonal architecture on a single cooperative executor.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioWindowActuator  CsvHistoryStore  LogEventSink             │
//! │  (ActuatorPort)      (HistorySink)    (EventSink)              │
//! │  Sim sensors/weather JsonConfigFile   console thread           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  doctor room · computer room · history ordering        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  control task (PeriodicSchedule)   command task (channel)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both tasks share one async mutex around the plant.  The control task
//! gathers inputs without it and holds it only for decide → actuate →
//! record, so a manual command waits at most for one window movement.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant};
use log::{info, warn};

use roomvent::adapters::config_file::JsonConfigFile;
use roomvent::adapters::console::{self, COMMAND_CHANNEL, SHUTDOWN};
use roomvent::adapters::gpio_window::{GpioWindowActuator, RelayPair};
use roomvent::adapters::log_sink::LogEventSink;
use roomvent::adapters::sim::{SimClimateSensor, SimCo2Sensor, SimEnvironment, SimPin, SimWeather};
use roomvent::app::inputs::InputGatherer;
use roomvent::app::ports::{
    ActuatorPort, ConfigError, ConfigPort, EventSink, HistorySink, WeatherProvider,
};
use roomvent::app::service::ControlLoop;
use roomvent::config::SystemConfig;
use roomvent::control::RoomId;
use roomvent::history::CsvHistoryStore;
use roomvent::pins;
use roomvent::scheduler::PeriodicSchedule;
use roomvent::sensors::{ClimateSensor, Co2Sensor};

const DEFAULT_CONFIG_PATH: &str = "roomvent.json";

/// Everything a tick or a command mutates.
struct Plant<A, H, E> {
    control: ControlLoop,
    actuators: A,
    history: H,
    events: E,
}

type Shared<A, H, E> = Mutex<NoopRawMutex, Plant<A, H, E>>;

// ── Tasks ─────────────────────────────────────────────────────

async fn control_task<A, H, E, C, D, W>(
    plant: &Shared<A, H, E>,
    inputs: &mut InputGatherer<C, D, W>,
    period: Duration,
) where
    A: ActuatorPort,
    H: HistorySink,
    E: EventSink,
    C: Co2Sensor,
    D: ClimateSensor,
    W: WeatherProvider,
{
    let mut schedule = PeriodicSchedule::new(period, Instant::now());
    loop {
        schedule.wait().await;

        // Slow reads happen without the lock.
        let gathered = inputs.gather().await;
        {
            let mut guard = plant.lock().await;
            let p = &mut *guard;
            p.control
                .apply(gathered, &mut p.actuators, &mut p.history, &mut p.events)
                .await;
        }

        schedule.advance(Instant::now());
    }
}

async fn command_task<A, H, E>(plant: &Shared<A, H, E>)
where
    A: ActuatorPort,
    H: HistorySink,
    E: EventSink,
{
    loop {
        let cmd = COMMAND_CHANNEL.receive().await;
        let mut guard = plant.lock().await;
        let p = &mut *guard;
        // Rejections are already reported through the event sink.
        let _ = p
            .control
            .handle_command(cmd, &mut p.actuators, &mut p.history, &mut p.events)
            .await;
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("RoomVent v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config from file (or defaults) ─────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let config_file = JsonConfigFile::new(&config_path);
    let config = match config_file.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("no config at {config_path}, using defaults");
            SystemConfig::default()
        }
        Err(e) => {
            warn!("config {config_path} rejected ({e}), using defaults");
            SystemConfig::default()
        }
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let sim = SimEnvironment::default();
    let relays = |room: RoomId| {
        let (open, close) = pins::relay_pins(room);
        RelayPair::new(SimPin::new(open, sim.clone()), SimPin::new(close, sim.clone()))
    };
    let mut actuators = GpioWindowActuator::new(
        relays(RoomId::DoctorRoom),
        relays(RoomId::ComputerRoom),
        config.window,
    );
    let history = CsvHistoryStore::from_config(&config.history);
    let mut events = LogEventSink::new();
    let mut inputs = InputGatherer::new(
        SimCo2Sensor::new(sim.clone()),
        SimClimateSensor::new(sim.clone()),
        SimWeather::new(sim.clone()),
        &config,
    )
    .context("sampling config")?;

    // ── 4. Domain core ────────────────────────────────────────
    let mut control = ControlLoop::new(config.clone());
    control.restore(&history, &mut events);
    control.start(&mut actuators, &mut events);

    let plant: Shared<_, _, _> = Mutex::new(Plant {
        control,
        actuators,
        history,
        events,
    });

    // ── 5. Console thread ─────────────────────────────────────
    console::spawn(sim.clone()).context("spawning console thread")?;

    // ── 6. Executor ───────────────────────────────────────────
    let period = Duration::from_secs(config.tick_interval_secs.into());
    {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        executor
            .spawn(control_task(&plant, &mut inputs, period))
            .detach();
        executor.spawn(command_task(&plant)).detach();

        futures_lite::future::block_on(executor.run(async {
            SHUTDOWN.wait().await;
            info!("shutdown requested, waiting for any window movement to finish");
            // Ticks and commands hold the lock while actuating.
            drop(plant.lock().await);
        }));
    }

    // ── 7. Release relays ─────────────────────────────────────
    let mut plant = plant.into_inner();
    plant.control.shutdown(&mut plant.actuators);
    info!("bye");
    Ok(())
}
