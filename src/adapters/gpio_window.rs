//! Relay-driven window actuator.
//!
//! Each window motor sits behind two active-LOW relays: one drives it
//! open, one drives it closed.  A movement pulls the selected relay low
//! for the configured travel time and then releases it.  The opposite
//! relay is released first so both are never energised together.
//!
//! ```text
//!   open:   open relay  ‾‾‾|________ opening_time ________|‾‾‾
//!   close:  close relay ‾‾‾|________ closing_time __________|‾‾‾
//! ```
//!
//! Generic over any `embedded_hal` [`OutputPin`], so the same code drives
//! real GPIO lines and the simulated pins used on the host.

use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::ActuatorPort;
use crate::config::WindowTiming;
use crate::control::{RoomId, WindowPosition};
use crate::error::ActuatorError;

/// Open/close relay pair of one window.
pub struct RelayPair<P> {
    pub open: P,
    pub close: P,
}

impl<P: OutputPin> RelayPair<P> {
    pub fn new(open: P, close: P) -> Self {
        Self { open, close }
    }

    /// Both relays off (HIGH).
    fn release(&mut self) -> Result<(), ActuatorError> {
        let open = self.open.set_high();
        let close = self.close.set_high();
        open.and(close).map_err(|_| ActuatorError::ReleaseFailed)
    }
}

pub struct GpioWindowActuator<P> {
    doctor: RelayPair<P>,
    computer: RelayPair<P>,
    timing: WindowTiming,
}

impl<P: OutputPin> GpioWindowActuator<P> {
    pub fn new(doctor: RelayPair<P>, computer: RelayPair<P>, timing: WindowTiming) -> Self {
        Self {
            doctor,
            computer,
            timing,
        }
    }

    fn relays(&mut self, room: RoomId) -> &mut RelayPair<P> {
        match room {
            RoomId::DoctorRoom => &mut self.doctor,
            RoomId::ComputerRoom => &mut self.computer,
        }
    }

    async fn drive(&mut self, room: RoomId, to: WindowPosition) -> Result<(), ActuatorError> {
        let travel_ms = match to {
            WindowPosition::Open => self.timing.opening_time_ms,
            WindowPosition::Closed => self.timing.closing_time_ms,
        };

        let pair = self.relays(room);
        pair.release()?;
        let relay = match to {
            WindowPosition::Open => &mut pair.open,
            WindowPosition::Closed => &mut pair.close,
        };

        relay
            .set_low()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        debug!("{room}: driving window {:?} for {travel_ms} ms", to);
        Timer::after(Duration::from_millis(travel_ms.into())).await;
        relay.set_high().map_err(|_| ActuatorError::ReleaseFailed)
    }
}

impl<P: OutputPin> ActuatorPort for GpioWindowActuator<P> {
    async fn open(&mut self, room: RoomId) -> Result<(), ActuatorError> {
        self.drive(room, WindowPosition::Open).await
    }

    async fn close(&mut self, room: RoomId) -> Result<(), ActuatorError> {
        self.drive(room, WindowPosition::Closed).await
    }

    fn release_all(&mut self) -> Result<(), ActuatorError> {
        let doctor = self.doctor.release();
        let computer = self.computer.release();
        doctor.and(computer)
    }
}
