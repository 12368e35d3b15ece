//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                   | Connects to                 |
//! |---------------|------------------------------|-----------------------------|
//! | `config_file` | ConfigPort                   | JSON file on disk           |
//! | `console`     | (input surface)              | stdin → command channel     |
//! | `gpio_window` | ActuatorPort                 | active-low relays (e-hal)   |
//! | `log_sink`    | EventSink                    | `log` facade                |
//! | `sim`         | Co2Sensor, ClimateSensor,    | in-memory simulated world   |
//! |               | WeatherProvider, OutputPin   |                             |
//!
//! The history file adapter lives with its record type in
//! [`crate::history`].

pub mod config_file;
pub mod console;
pub mod gpio_window;
pub mod log_sink;
pub mod sim;
