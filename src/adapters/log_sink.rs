//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every application event as one
//! tagged log line.  This is the operator's notification surface on the
//! console; a dashboard adapter would implement the same trait.

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, InputFallback};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn temp(t: Option<f64>) -> String {
    t.map_or_else(|| "--".into(), |t| format!("{t:.1}\u{00b0}C"))
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { tick_interval_secs } => {
                info!("START | ticking every {}s", tick_interval_secs);
            }
            AppEvent::Restored { doctor, computer } => {
                info!("START | restored doctor={:?} computer={:?}", doctor, computer);
            }
            AppEvent::WindowMoved(t) => {
                info!(
                    "WINDOW | {} {:?} -> {:?} (reason={:?})",
                    t.room, t.from, t.to, t.reason
                );
            }
            AppEvent::ActuatorFault { room, error } => {
                error!("FAULT | {} window: {} (position uncertain)", room, error);
            }
            AppEvent::InputFallback(f) => match f {
                InputFallback::Co2Skipped(cause) => {
                    warn!("INPUT | co2 unavailable ({}), computer room skipped", cause);
                }
                InputFallback::DoctorTemperature {
                    substituted_c,
                    cause,
                } => {
                    warn!("INPUT | {}, using {:.1}\u{00b0}C", cause, substituted_c);
                }
                InputFallback::OutdoorCached { cached_c, cause } => {
                    warn!("INPUT | {}, outdoor stays {}", cause, temp(*cached_c));
                }
            },
            AppEvent::Sampled(s) => {
                info!(
                    "CO2 | {:.0} ppm {:.1}\u{00b0}C {:.1} %",
                    s.co2_ppm, s.temperature_c, s.humidity_pct
                );
            }
            AppEvent::AutoModeChanged { room, enabled } => {
                info!(
                    "MODE | {} auto mode {}",
                    room,
                    if *enabled { "ON" } else { "OFF" }
                );
            }
            AppEvent::CommandRejected { room, reason } => {
                warn!("CMD | {} refused: {}", room, reason);
            }
            AppEvent::Recorded(r) => {
                debug!(
                    "TICK | out={} doctor={} {:?} computer={} {:?} co2={:?} why={:?}",
                    temp(r.outside_temp_c),
                    temp(r.doctor_temp_c),
                    r.doctor_position,
                    temp(r.computer_temp_c),
                    r.computer_position,
                    r.computer_co2_ppm,
                    r.open_reason
                );
            }
            AppEvent::HistoryPruned => {
                info!("HISTORY | data file cleaned");
            }
            AppEvent::PersistenceFault(e) => {
                error!("FAULT | history: {}", e);
            }
            AppEvent::Status(s) => {
                for (name, room) in [("doctor", &s.doctor), ("computer", &s.computer)] {
                    info!(
                        "STATUS | {} window={:?} auto={} T={} co2={:?}{}",
                        name,
                        room.position,
                        room.auto_mode,
                        temp(room.indoor_temp_c),
                        room.co2_ppm,
                        if room.actuator_fault.is_some() {
                            " (actuator fault)"
                        } else {
                            ""
                        }
                    );
                }
                info!("STATUS | outdoor {}", temp(s.outside_temp_c));
            }
        }
    }
}
