//! Commander queue: asynchronous senders, drained once per tick.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use fire_common::consts::MAX_COMMANDS_PER_TICK;
use fire_common::control_unit::state::ShootingMode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::intake::{ArmAction, RollerAction};

/// Decoded commander request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireCommand {
    /// Set the aiming mode (recorded only).
    SetMode(ShootingMode),
    /// Latch the operator shot request.
    SetRequestShot(bool),
    /// Turret: enter closed-loop tracking.
    EnableTurretClosedLoop,
    /// Turret: disable and command zero.
    DisableTurret,
    /// Turret: manual percent override.
    SetTurretManualPercent(f64),
    /// Shooter: closed-loop velocity at the target RPM tunable.
    EnableShooter,
    /// Shooter: 0 V.
    DisableShooter,
    /// Shooter: open-loop voltage.
    SetShooterVolts(f64),
    Intake(ArmAction),
    IntakeRollers(RollerAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The control loop has shut down.
    #[error("command queue disconnected")]
    Disconnected,
}

/// Commander side of the queue. Cloneable across threads.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<FireCommand>,
}

impl CommandSender {
    pub fn send(&self, command: FireCommand) -> Result<(), CommandError> {
        self.tx.send(command).map_err(|_| CommandError::Disconnected)
    }

    pub fn set_mode(&self, mode: ShootingMode) -> Result<(), CommandError> {
        self.send(FireCommand::SetMode(mode))
    }

    pub fn set_request_shot(&self, request: bool) -> Result<(), CommandError> {
        self.send(FireCommand::SetRequestShot(request))
    }

    pub fn enable_turret_closed_loop(&self) -> Result<(), CommandError> {
        self.send(FireCommand::EnableTurretClosedLoop)
    }

    pub fn disable_turret(&self) -> Result<(), CommandError> {
        self.send(FireCommand::DisableTurret)
    }

    pub fn set_turret_manual_percent(&self, percent: f64) -> Result<(), CommandError> {
        self.send(FireCommand::SetTurretManualPercent(percent))
    }

    pub fn enable_shooter(&self) -> Result<(), CommandError> {
        self.send(FireCommand::EnableShooter)
    }

    pub fn disable_shooter(&self) -> Result<(), CommandError> {
        self.send(FireCommand::DisableShooter)
    }
}

/// Control-loop side of the queue.
#[derive(Debug)]
pub struct CommandQueue {
    rx: Receiver<FireCommand>,
    /// First command past a full batch; applied first on the next drain.
    deferred: Option<FireCommand>,
    disconnected: bool,
}

/// Commands drained in one tick, in arrival order.
pub type CommandBatch = heapless::Vec<FireCommand, MAX_COMMANDS_PER_TICK>;

impl CommandQueue {
    pub fn new() -> (CommandSender, Self) {
        let (tx, rx) = mpsc::channel();
        (
            CommandSender { tx },
            Self {
                rx,
                deferred: None,
                disconnected: false,
            },
        )
    }

    /// Whether every sender has been dropped.
    #[inline]
    pub const fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Whether the last drain left commands for the next tick.
    #[inline]
    pub const fn has_backlog(&self) -> bool {
        self.deferred.is_some()
    }

    /// Take up to [`MAX_COMMANDS_PER_TICK`] pending commands without
    /// blocking. The remainder stays queued for the next tick.
    pub fn drain(&mut self) -> CommandBatch {
        let mut batch = CommandBatch::new();
        while !batch.is_full() {
            let Some(command) = self.deferred.take().or_else(|| self.try_next()) else {
                return batch;
            };
            // Cannot fail: capacity checked above.
            let _ = batch.push(command);
        }
        self.deferred = self.try_next();
        if self.deferred.is_some() {
            warn!(limit = MAX_COMMANDS_PER_TICK, "command backlog, deferring to next tick");
        }
        batch
    }

    fn try_next(&mut self) -> Option<FireCommand> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    debug!("all command senders dropped");
                    self.disconnected = true;
                }
                None
            }
        }
    }
}
