//! Readiness aggregation: a single false input vetoes firing.

use fire_common::control_unit::zone::{ReadinessSnapshot, ReadinessVeto};

/// Logical AND of the four readiness inputs.
#[inline]
pub const fn is_ready(shooter_ready: bool, turret_ready: bool, hood_ready: bool, field_ready: bool) -> bool {
    shooter_ready && turret_ready && hood_ready && field_ready
}

/// Ready flag plus the set of inputs that vetoed it.
#[inline]
pub fn aggregate(snapshot: &ReadinessSnapshot) -> (bool, ReadinessVeto) {
    let ready = is_ready(
        snapshot.shooter_ready,
        snapshot.turret_ready,
        snapshot.hood_ready,
        snapshot.field_ready,
    );
    (ready, snapshot.vetoes())
}
