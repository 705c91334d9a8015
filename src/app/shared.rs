//! Single-writer access to the controller from concurrent execution units.
//!
//! ```text
//!  ┌──────────────┐ on_temperature_sample ┌───────────────────────┐
//!  │ sensor unit  │──────────────────────▶│  Mutex<Controller>    │
//!  └──────────────┘                       │  (one writer at once) │
//!  ┌──────────────┐ on_button_event       │                       │
//!  │ button unit  │──────────────────────▶│   StateChange pushed  │
//!  └──────────────┘                       │   under the same lock │
//!                                         └──────────┬────────────┘
//!                                                    │ CHANGES (FIFO)
//!                                         ┌──────────▼────────────┐
//!                                         │  output unit          │
//!                                         │  display + telemetry  │
//!                                         └───────────────────────┘
//! ```
//!
//! The whole read-modify-write of mode, temperature and activation runs
//! inside one lock, and the resulting snapshot is queued before the lock
//! is released, so the queue order is the mutation order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use super::controller::ThermostatController;
use super::events::StateChange;
use super::state::{Temperature, ThermostatState};
use crate::error::SensorError;
use crate::fsm::ButtonEvent;

/// Pending change notifications.  Once full, new changes are not queued
/// and the overflow flag is raised instead.
pub const CHANGE_DEPTH: usize = 16;

pub struct SharedController {
    inner: Mutex<ThermostatController>,
    changes: Channel<CriticalSectionRawMutex, StateChange, CHANGE_DEPTH>,
    /// Set when a change could not be queued; cleared by
    /// [`SharedController::recover_overflow`].
    overflowed: AtomicBool,
}

impl SharedController {
    pub fn new(controller: ThermostatController) -> Self {
        Self {
            inner: Mutex::new(controller),
            changes: Channel::new(),
            overflowed: AtomicBool::new(false),
        }
    }

    pub fn on_button_event(&self, event: ButtonEvent, now: DateTime<Utc>) -> Option<StateChange> {
        self.apply(|c| c.on_button_event(event, now))
    }

    pub fn on_temperature_sample(
        &self,
        sample: Result<Temperature, SensorError>,
        now: DateTime<Utc>,
    ) -> Option<StateChange> {
        self.apply(|c| c.on_temperature_sample(sample, now))
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> ThermostatState {
        self.lock().snapshot()
    }

    /// Oldest queued change, if any.
    pub fn next_change(&self) -> Option<StateChange> {
        self.changes.try_receive().ok()
    }

    /// If changes were dropped since the last call, discard whatever is
    /// still queued and return the current state in their place.
    ///
    /// Runs under the controller lock, so nothing can be queued between
    /// the discard and the snapshot: the returned state reflects every
    /// discarded change and anything queued afterwards is newer.
    pub fn recover_overflow(&self) -> Option<ThermostatState> {
        let controller = self.lock();
        if !self.overflowed.swap(false, Ordering::AcqRel) {
            return None;
        }
        let mut stale = 0usize;
        while self.changes.try_receive().is_ok() {
            stale += 1;
        }
        debug!("Overflow recovery: {} queued changes superseded", stale);
        Some(controller.snapshot())
    }

    fn apply(
        &self,
        f: impl FnOnce(&mut ThermostatController) -> Option<StateChange>,
    ) -> Option<StateChange> {
        let mut controller = self.lock();
        let change = f(&mut controller);
        if let Some(change) = change {
            if self.changes.try_send(change).is_err() {
                warn!("Change queue full, dropping {:?}", change.cause);
                self.overflowed.store(true, Ordering::Release);
            }
        }
        drop(controller);
        change
    }

    /// The controller never panics mid-mutation, so a poisoned lock still
    /// guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, ThermostatController> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
