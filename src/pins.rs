//! GPIO pin assignments for the ventilation controller board (BCM numbering).
//!
//! Single source of truth: the binary and any hardware adapter reference
//! this module rather than hard-coding pin numbers.

use crate::control::RoomId;

// ---------------------------------------------------------------------------
// Window motor relays (active LOW)
// ---------------------------------------------------------------------------

/// Doctor's office window, drive-open relay.
pub const DOCTOR_OPEN_RELAY_GPIO: u8 = 13;
/// Doctor's office window, drive-close relay.
pub const DOCTOR_CLOSE_RELAY_GPIO: u8 = 16;

/// Computer room window, drive-open relay.
pub const COMPUTER_OPEN_RELAY_GPIO: u8 = 5;
/// Computer room window, drive-close relay.
pub const COMPUTER_CLOSE_RELAY_GPIO: u8 = 26;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 data line (doctor's office).
pub const DHT22_DATA_GPIO: u8 = 6;

/// `(open, close)` relay pins for a room.
pub const fn relay_pins(room: RoomId) -> (u8, u8) {
    match room {
        RoomId::DoctorRoom => (DOCTOR_OPEN_RELAY_GPIO, DOCTOR_CLOSE_RELAY_GPIO),
        RoomId::ComputerRoom => (COMPUTER_OPEN_RELAY_GPIO, COMPUTER_CLOSE_RELAY_GPIO),
    }
}
