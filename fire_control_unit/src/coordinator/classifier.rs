//! Shot classifier: fixed-priority decision list over the zone flags.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is a
//! safety interlock: the trench check must precede every other rule.

use fire_common::control_unit::state::ShotType;
use fire_common::control_unit::zone::ZoneContext;

/// One entry of the decision list.
#[derive(Debug, Clone, Copy)]
pub struct ShotRule {
    pub name: &'static str,
    pub matches: fn(&ZoneContext) -> bool,
    pub result: ShotType,
}

fn in_trench(z: &ZoneContext) -> bool {
    z.in_trench_zone
}

fn field_unresolved(z: &ZoneContext) -> bool {
    !z.field_ready
}

fn in_alliance(z: &ZoneContext) -> bool {
    z.in_alliance_zone
}

fn in_neutral_or_opponent(z: &ZoneContext) -> bool {
    z.in_neutral_zone || z.in_opponent_zone
}

/// Decision list in priority order. Falling off the end yields `None`.
pub const SHOT_RULES: [ShotRule; 4] = [
    ShotRule {
        name: "trench",
        matches: in_trench,
        result: ShotType::Blocked,
    },
    ShotRule {
        name: "field_unresolved",
        matches: field_unresolved,
        result: ShotType::None,
    },
    ShotRule {
        name: "alliance",
        matches: in_alliance,
        result: ShotType::Shoot,
    },
    ShotRule {
        name: "neutral_or_opponent",
        matches: in_neutral_or_opponent,
        result: ShotType::Pass,
    },
];

/// The first rule matching `zone`, if any.
#[inline]
pub fn matching_rule(zone: &ZoneContext) -> Option<&'static ShotRule> {
    SHOT_RULES.iter().find(|rule| (rule.matches)(zone))
}

/// Classify a zone snapshot. Pure and total.
#[inline]
pub fn classify(zone: &ZoneContext) -> ShotType {
    matching_rule(zone).map_or(ShotType::None, |rule| rule.result)
}

// ─── Tests ──────────────────────────────────────────────────────────
