//! Ordered rule tables and the shared decision function.
//!
//! Each rule is a plain `fn` pointer predicate plus the position it
//! applies from and the position it leads to.  The first rule whose
//! position guard and predicate both match decides; later rules are not
//! consulted.  The leading rule of each table is the dominant safety
//! rule: it has no position guard, so it also matches a closed window and
//! stops evaluation there (no change) rather than letting a temperature
//! or CO2 rule open it.
//!
//! ```text
//!  DOCTOR ROOM                         COMPUTER ROOM
//!  1 any    outdoor useless ─▶ Closed   1 any    outdoor too cold ─▶ Closed
//!  2 Closed too warm        ─▶ Open     2 Closed too warm, Δt > 2 ─▶ Open (temperature)
//!  3 Open   cool enough     ─▶ Closed   3 Closed CO2 high        ─▶ Open (co2)
//!                                       4 Open   cool enough     ─▶ Closed
//!                                       5 Open   CO2 low         ─▶ Closed
//! ```

use super::{Conditions, Decision, OpenReason, RoomId, WindowPosition};
use crate::config::RoomLimits;

/// Predicate over the current measurements and the room's limits.
pub type Predicate = fn(&Conditions, &RoomLimits) -> bool;

/// One row of a rule table.
pub struct Rule {
    pub label: &'static str,
    /// Position the rule applies from; `None` matches either.
    pub from: Option<WindowPosition>,
    pub when: Predicate,
    pub to: WindowPosition,
    /// Recorded when the rule opens the window.
    pub reason: OpenReason,
}

pub static DOCTOR_ROOM_RULES: [Rule; 3] = [
    Rule {
        label: "outdoor air cannot cool",
        from: None,
        when: venting_ineffective,
        to: WindowPosition::Closed,
        reason: OpenReason::Unknown,
    },
    Rule {
        label: "too warm",
        from: Some(WindowPosition::Closed),
        when: too_warm,
        to: WindowPosition::Open,
        reason: OpenReason::Unknown,
    },
    Rule {
        label: "cool enough",
        from: Some(WindowPosition::Open),
        when: cool_enough,
        to: WindowPosition::Closed,
        reason: OpenReason::Unknown,
    },
];

pub static COMPUTER_ROOM_RULES: [Rule; 5] = [
    Rule {
        label: "outdoor too cold",
        from: None,
        when: outdoor_too_cold,
        to: WindowPosition::Closed,
        reason: OpenReason::Unknown,
    },
    Rule {
        label: "too warm",
        from: Some(WindowPosition::Closed),
        when: too_warm_and_cooler_outside,
        to: WindowPosition::Open,
        reason: OpenReason::TemperatureTrigger,
    },
    Rule {
        label: "co2 high",
        from: Some(WindowPosition::Closed),
        when: co2_high,
        to: WindowPosition::Open,
        reason: OpenReason::Co2Trigger,
    },
    Rule {
        label: "cool enough",
        from: Some(WindowPosition::Open),
        when: cool_enough_and_co2_not_high,
        to: WindowPosition::Closed,
        reason: OpenReason::Unknown,
    },
    Rule {
        label: "co2 low",
        from: Some(WindowPosition::Open),
        when: co2_low_and_not_too_warm,
        to: WindowPosition::Closed,
        reason: OpenReason::Unknown,
    },
];

pub fn rule_table(room: RoomId) -> &'static [Rule] {
    match room {
        RoomId::DoctorRoom => &DOCTOR_ROOM_RULES,
        RoomId::ComputerRoom => &COMPUTER_ROOM_RULES,
    }
}

/// Evaluate `rules` top to bottom for a window currently at `position`.
pub fn decide(
    rules: &[Rule],
    limits: &RoomLimits,
    conditions: &Conditions,
    position: WindowPosition,
) -> Decision {
    for rule in rules {
        if rule.from.is_some_and(|from| from != position) {
            continue;
        }
        if !(rule.when)(conditions, limits) {
            continue;
        }

        let changed = rule.to != position;
        let reason = if changed && rule.to == WindowPosition::Open {
            rule.reason
        } else {
            OpenReason::Unknown
        };
        return Decision {
            position: rule.to,
            reason,
            changed,
            rule: Some(rule.label),
        };
    }

    Decision::hold(position)
}

// ── Predicates ────────────────────────────────────────────────

fn venting_ineffective(c: &Conditions, l: &RoomLimits) -> bool {
    c.outside_temp_c < l.min_outside_temperature_c
        || c.differential() < l.min_temperature_differential_c
}

fn outdoor_too_cold(c: &Conditions, l: &RoomLimits) -> bool {
    c.outside_temp_c < l.min_outside_temperature_c
}

fn too_warm(c: &Conditions, l: &RoomLimits) -> bool {
    c.indoor_temp_c > l.max_temperature_c
}

fn too_warm_and_cooler_outside(c: &Conditions, l: &RoomLimits) -> bool {
    too_warm(c, l) && c.differential() > l.min_temperature_differential_c
}

fn cool_enough(c: &Conditions, l: &RoomLimits) -> bool {
    c.indoor_temp_c < l.min_temperature_c
}

fn co2_high(c: &Conditions, l: &RoomLimits) -> bool {
    matches!((c.co2_ppm, l.co2), (Some(ppm), Some(co2)) if ppm > co2.max_ppm)
}

fn co2_low(c: &Conditions, l: &RoomLimits) -> bool {
    matches!((c.co2_ppm, l.co2), (Some(ppm), Some(co2)) if ppm < co2.min_ppm)
}

// A close rule stays quiet while the other channel would reopen the window.

fn cool_enough_and_co2_not_high(c: &Conditions, l: &RoomLimits) -> bool {
    cool_enough(c, l) && !co2_high(c, l)
}

fn co2_low_and_not_too_warm(c: &Conditions, l: &RoomLimits) -> bool {
    co2_low(c, l) && !too_warm_and_cooler_outside(c, l)
}
