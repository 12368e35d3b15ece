//! Line-oriented console input.
//!
//! A dedicated std thread reads stdin and forwards operator commands to the
//! control task through a static `embassy-sync` channel, the same bridge
//! the control loop uses for any other input surface.
//!
//! ```text
//! ┌──────────────┐  AppCommand   ┌──────────────┐
//! │ stdin thread │─────────────▶│ command task │
//! │  (blocking)  │   SHUTDOWN    │   (async)    │
//! └──────────────┘─────────────▶└──────────────┘
//! ```
//!
//! Grammar:
//!
//! ```text
//! open <room> | close <room> | auto <room> | status | help | quit
//! sim outdoor|doctor|computer <celsius> | sim co2 <ppm>
//! sim fail co2|dht|weather|relays on|off
//! <room> = doctor | computer | 0 | 1
//! ```

use std::io::BufRead;
use std::num::IntErrorKind;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;
use log::{info, warn};

use super::sim::{SimCommand, SimEnvironment, SimFault};
use crate::app::commands::AppCommand;
use crate::control::RoomId;
use crate::error::Error;

/// Channel depth for operator commands.
const COMMAND_DEPTH: usize = 8;

/// Inbound command channel: console thread → command task.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH> =
    Channel::new();

/// Raised once to stop the executor.
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

const HELP: &str = "commands: open|close|auto <doctor|computer|0|1>, status, quit, \
                    sim outdoor|doctor|computer <C>, sim co2 <ppm>, \
                    sim fail co2|dht|weather|relays on|off";

/// One parsed console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleInput {
    Command(AppCommand),
    Sim(SimCommand),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument,
    /// A numeric room selector outside the known rooms.
    Room(Error),
    BadValue,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::Room(e) => write!(f, "{e}"),
            Self::BadValue => write!(f, "bad value"),
        }
    }
}

pub fn parse_room(token: &str) -> Result<RoomId, ParseError> {
    match token {
        "doctor" => Ok(RoomId::DoctorRoom),
        "computer" => Ok(RoomId::ComputerRoom),
        other => {
            // Any integer is a selector; out-of-range ones saturate.
            let raw = match other.parse::<i64>() {
                Ok(n) => n,
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => i64::MAX,
                    IntErrorKind::NegOverflow => i64::MIN,
                    _ => return Err(ParseError::BadValue),
                },
            };
            RoomId::from_selector(raw).map_err(ParseError::Room)
        }
    }
}

fn parse_value(token: Option<&&str>) -> Result<f64, ParseError> {
    let token = token.ok_or(ParseError::MissingArgument)?;
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ParseError::BadValue)
}

fn parse_sim(args: &[&str]) -> Result<SimCommand, ParseError> {
    let what = args.first().ok_or(ParseError::MissingArgument)?;
    match *what {
        "outdoor" => parse_value(args.get(1)).map(SimCommand::Outdoor),
        "doctor" => parse_value(args.get(1)).map(SimCommand::DoctorTemperature),
        "computer" => parse_value(args.get(1)).map(SimCommand::ComputerTemperature),
        "co2" => parse_value(args.get(1)).map(SimCommand::Co2),
        "fail" => {
            let fault = match *args.get(1).ok_or(ParseError::MissingArgument)? {
                "co2" => SimFault::Co2,
                "dht" => SimFault::Dht,
                "weather" => SimFault::Weather,
                "relays" => SimFault::Relays,
                _ => return Err(ParseError::BadValue),
            };
            let on = match *args.get(2).ok_or(ParseError::MissingArgument)? {
                "on" => true,
                "off" => false,
                _ => return Err(ParseError::BadValue),
            };
            Ok(SimCommand::Fail(fault, on))
        }
        _ => Err(ParseError::UnknownCommand),
    }
}

pub fn parse_line(line: &str) -> Result<ConsoleInput, ParseError> {
    let tokens: Vec<&str, 4> = line.split_whitespace().take(4).collect();
    let (verb, args) = tokens.split_first().ok_or(ParseError::Empty)?;

    let room = || -> Result<RoomId, ParseError> {
        parse_room(args.first().ok_or(ParseError::MissingArgument)?)
    };

    match *verb {
        "open" => Ok(ConsoleInput::Command(AppCommand::Open(room()?))),
        "close" => Ok(ConsoleInput::Command(AppCommand::Close(room()?))),
        "auto" => Ok(ConsoleInput::Command(AppCommand::ToggleAutoMode(room()?))),
        "status" => Ok(ConsoleInput::Command(AppCommand::ReportStatus)),
        "sim" => parse_sim(args).map(ConsoleInput::Sim),
        "help" | "?" => Ok(ConsoleInput::Help),
        "quit" | "exit" => Ok(ConsoleInput::Quit),
        _ => Err(ParseError::UnknownCommand),
    }
}

// ── Reader thread ────────────────────────────────────────────

/// Spawn the stdin reader.  End of input counts as `quit`.
pub fn spawn(sim: SimEnvironment) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || read_loop(&sim))
}

fn read_loop(sim: &SimEnvironment) {
    info!("console ready ({HELP})");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match parse_line(&line) {
            Ok(ConsoleInput::Command(cmd)) => {
                if COMMAND_CHANNEL.try_send(cmd).is_err() {
                    warn!("console: command queue full, {:?} dropped", cmd);
                }
            }
            Ok(ConsoleInput::Sim(cmd)) => sim.apply(cmd),
            Ok(ConsoleInput::Help) => info!("{HELP}"),
            Ok(ConsoleInput::Quit) => break,
            Err(ParseError::Empty) => {}
            Err(e) => warn!("console: '{}': {e}", line.trim()),
        }
    }
    SHUTDOWN.signal(());
}
