//! Periodic job engine.
//!
//! The scheduler knows nothing about threads or clocks.  The owning
//! execution unit feeds it elapsed time and it notifies a
//! [`SchedulerDelegate`] for every job that came due.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    output unit loop                  │
//! │                                                      │
//! │   sleep(tick) ──▶ Scheduler::tick(elapsed_ms) ──┐    │
//! │                                                 │    │
//! │        ┌────────────────────────────────────────┘    │
//! │        ▼                                             │
//! │  ┌────────────────┐ ┌──────────┐ ┌────────────────┐  │
//! │  │ DisplayRefresh │ │ PageFlip │ │ Telemetry      │  │
//! │  │ (1 s)          │ │ (5 s)    │ │ (30 s)         │  │
//! │  └───────┬────────┘ └────┬─────┘ └───────┬────────┘  │
//! │          └──────────▶ delegate ◀─────────┘           │
//! └──────────────────────────────────────────────────────┘
//! ```

use log::{debug, info};

/// Work a unit performs on a fixed cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Redraw the display (the clock line moves every second).
    DisplayRefresh,
    /// Alternate the second display line.
    PageFlip,
    /// Periodic status report.
    Telemetry,
}

/// Receives due-job notifications from [`Scheduler::tick`].
pub trait SchedulerDelegate {
    fn on_job_due(&mut self, job: Job);
}

/// Maximum number of jobs per scheduler (stack-allocated).
const MAX_JOBS: usize = 3;

#[derive(Debug, Clone, Copy)]
struct Slot {
    job: Job,
    period_ms: u64,
    elapsed_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: heapless::Vec<Slot, MAX_JOBS>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job` to fire every `period_ms`.  A job already present
    /// is re-timed.  Returns `false` when all slots are taken.
    pub fn add(&mut self, job: Job, period_ms: u64) -> bool {
        let period_ms = period_ms.max(1);
        if let Some(slot) = self.slots.iter_mut().find(|s| s.job == job) {
            slot.period_ms = period_ms;
            slot.elapsed_ms = 0;
            info!("Scheduler: {:?} re-timed to {} ms", job, period_ms);
            return true;
        }
        let added = self
            .slots
            .push(Slot {
                job,
                period_ms,
                elapsed_ms: 0,
            })
            .is_ok();
        if added {
            info!("Scheduler: {:?} every {} ms", job, period_ms);
        }
        added
    }

    /// Advance time by `elapsed_ms`.
    ///
    /// A job fires at most once per tick even if the gap spans several
    /// periods; a stalled unit catches up with one run, not a burst.
    pub fn tick(&mut self, elapsed_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for slot in self.slots.iter_mut() {
            slot.elapsed_ms = slot.elapsed_ms.saturating_add(elapsed_ms);
            if slot.elapsed_ms >= slot.period_ms {
                if slot.elapsed_ms >= slot.period_ms * 2 {
                    debug!("Scheduler: {:?} overran ({} ms)", slot.job, slot.elapsed_ms);
                }
                slot.elapsed_ms %= slot.period_ms;
                delegate.on_job_due(slot.job);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
