//! Feed gate: turns (request, readiness, shot type) into a feed command.
//!
//! The command is recomputed and re-issued every tick, not only on change,
//! so a command dropped by an actuator on one tick is repeated on the next.

use fire_common::control_unit::state::{FeedCommand, FeedState, ShotType};
use tracing::debug;

/// `request_shot ∧ ready_to_fire ∧ shot_type ∉ {None, Blocked}`.
#[inline]
pub const fn allow_feed(request_shot: bool, ready_to_fire: bool, shot_type: ShotType) -> bool {
    request_shot && ready_to_fire && shot_type.permits_feed()
}

/// Owner of the [`FeedState`] latch.
#[derive(Debug, Clone, Default)]
pub struct FeedGate {
    state: FeedState,
}

impl FeedGate {
    pub const fn new() -> Self {
        Self {
            state: FeedState::Stopped,
        }
    }

    #[inline]
    pub const fn state(&self) -> FeedState {
        self.state
    }

    /// Evaluate the gate for this tick.
    pub fn tick(&mut self, request_shot: bool, ready_to_fire: bool, shot_type: ShotType) -> FeedCommand {
        let command = if allow_feed(request_shot, ready_to_fire, shot_type) {
            FeedCommand::Feed
        } else {
            FeedCommand::Stop
        };

        let next = command.resulting_state();
        match (self.state, next) {
            (FeedState::Stopped, FeedState::Feeding) => {
                debug!(shot = shot_type.as_str(), "feed gate opened");
            }
            (FeedState::Feeding, FeedState::Stopped) => {
                debug!(request_shot, ready_to_fire, shot = shot_type.as_str(), "feed gate closed");
            }
            _ => {}
        }
        self.state = next;
        command
    }
}
