//! Fuzz target: room rule tables
//!
//! Builds arbitrary measurements (including NaN and infinities) from the
//! fuzz bytes and evaluates both rooms from both window positions.
//!
//! Invariants checked:
//! - No panics
//! - A decision that moves the window is stable: re-deciding from the new
//!   position with the same measurements does not move it again
//! - Only an opening decision carries a reason
//!
//! cargo fuzz run fuzz_rule_tables

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomvent::config::SystemConfig;
use roomvent::control::rules::{decide, rule_table};
use roomvent::control::{Conditions, OpenReason, RoomId, WindowPosition};

fuzz_target!(|data: &[u8]| {
    if data.len() < 24 {
        return;
    }
    let f = |i: usize| {
        let mut b = [0u8; 8];
        b.copy_from_slice(&data[i * 8..i * 8 + 8]);
        f64::from_le_bytes(b)
    };

    let config = SystemConfig::default();
    for room in RoomId::ALL {
        let conditions = Conditions {
            indoor_temp_c: f(0),
            outside_temp_c: f(1),
            co2_ppm: (room == RoomId::ComputerRoom).then(|| f(2)),
        };
        let limits = config.limits(room);

        for at in [WindowPosition::Closed, WindowPosition::Open] {
            let first = decide(rule_table(room), limits, &conditions, at);
            if first.reason != OpenReason::Unknown {
                assert_eq!(first.position, WindowPosition::Open);
                assert!(first.changed);
            }
            if first.changed {
                let second = decide(rule_table(room), limits, &conditions, first.position);
                assert!(!second.changed, "{room}: window flaps from {at:?}");
            }
        }
    }
});
