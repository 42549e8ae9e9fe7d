//! Live-tunable parameter store.
//!
//! A process-wide key → scalar map with external-write / internal-read
//! discipline: operators (dashboard, config overrides) call
//! [`TunableStore::set`]; control code only ever reads through a
//! [`Tunable`] handle, once per tick.
//!
//! Keys follow the `Subsystem/Name` convention, e.g. `Turret/kP`.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned by store writes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TunableError {
    /// The key was never registered by any subsystem.
    #[error("unknown tunable '{0}'")]
    UnknownKey(String),
    /// NaN or infinite values are refused at the write boundary.
    #[error("tunable '{key}' rejects non-finite value {value}")]
    NonFinite { key: String, value: f64 },
    /// A writer panicked while holding the store lock.
    #[error("tunable store unavailable")]
    StoreUnavailable,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    default: f64,
    value: f64,
}

/// Shared store of live-adjustable scalars.
///
/// Cloning the store is cheap and yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct TunableStore {
    inner: Arc<RwLock<BTreeMap<String, Entry>>>,
}

impl TunableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` with a default and return a read handle.
    ///
    /// Registering an existing key keeps its current value, so a subsystem
    /// built after overrides were applied still observes the override.
    pub fn register(&self, key: &'static str, default: f64) -> Tunable {
        match self.inner.write() {
            Ok(mut map) => {
                map.entry(key.to_string())
                    .or_insert(Entry { default, value: default });
            }
            Err(_) => warn!(key, "tunable store lock poisoned during register"),
        }
        Tunable {
            key,
            default,
            store: self.clone(),
        }
    }

    /// Externally set a registered tunable.
    pub fn set(&self, key: &str, value: f64) -> Result<(), TunableError> {
        if !value.is_finite() {
            return Err(TunableError::NonFinite {
                key: key.to_string(),
                value,
            });
        }
        let mut map = self
            .inner
            .write()
            .map_err(|_| TunableError::StoreUnavailable)?;
        let entry = map
            .get_mut(key)
            .ok_or_else(|| TunableError::UnknownKey(key.to_string()))?;
        if entry.value != value {
            debug!(key, old = entry.value, new = value, "tunable updated");
        }
        entry.value = value;
        Ok(())
    }

    /// Apply a batch of overrides (e.g. the `[tunables]` table of the config
    /// file). Stops at the first unknown key or non-finite value.
    pub fn apply_overrides(&self, overrides: &BTreeMap<String, f64>) -> Result<(), TunableError> {
        for (key, value) in overrides {
            self.set(key, *value)?;
        }
        Ok(())
    }

    /// Current value of `key`, if registered.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.inner.read().ok()?.get(key).map(|e| e.value)
    }

    /// Restore every tunable to its registered default.
    pub fn reset_to_defaults(&self) {
        if let Ok(mut map) = self.inner.write() {
            for entry in map.values_mut() {
                entry.value = entry.default;
            }
        }
    }

    /// Snapshot of all registered keys and their current values.
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.inner
            .read()
            .map(|map| map.iter().map(|(k, e)| (k.clone(), e.value)).collect())
            .unwrap_or_default()
    }
}

/// Read handle for a single tunable.
#[derive(Debug, Clone)]
pub struct Tunable {
    key: &'static str,
    default: f64,
    store: TunableStore,
}

impl Tunable {
    /// Current value; falls back to the default if the store is unavailable.
    #[inline]
    pub fn get(&self) -> f64 {
        self.store.get(self.key).unwrap_or(self.default)
    }

    #[inline]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub const fn default_value(&self) -> f64 {
        self.default
    }
}

/// Tracks the last value pushed to hardware so that re-configuration only
/// happens when a tunable actually moved.
#[derive(Debug, Clone, Copy)]
pub struct ChangeTracker {
    last: f64,
    epsilon: f64,
}

impl ChangeTracker {
    pub const fn new(initial: f64, epsilon: f64) -> Self {
        Self {
            last: initial,
            epsilon,
        }
    }

    /// Returns `Some(value)` and latches it if it differs from the last
    /// applied value by more than epsilon.
    #[inline]
    pub fn update(&mut self, value: f64) -> Option<f64> {
        if (value - self.last).abs() > self.epsilon {
            self.last = value;
            Some(value)
        } else {
            None
        }
    }

    #[inline]
    pub const fn last(&self) -> f64 {
        self.last
    }
}
