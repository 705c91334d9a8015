//! Sensor fault supervisor.
//!
//! The supervisor counts consecutive failed temperature reads and latches
//! a fault once the configured threshold is reached.  While the fault is
//! latched the controller treats the temperature as unknown, which forces
//! both actuators off without touching the selected mode.
//!
//! ## Fault lifecycle
//!
//! 1. A read fails; the consecutive-failure counter increments.
//! 2. When the counter reaches `threshold`, the fault latches.
//! 3. Further failures keep counting; the fault stays latched.
//! 4. The first successful read clears both the counter and the fault.

use log::{error, info, warn};

use crate::error::SensorError;

/// Outcome of feeding one read result to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    /// Nothing changed about the latched state.
    Unchanged,
    /// This failure reached the threshold.
    Tripped,
    /// A successful read cleared a latched fault.
    Cleared,
}

#[derive(Debug, Clone)]
pub struct SensorSupervisor {
    threshold: u32,
    consecutive_failures: u32,
    tripped: bool,
}

impl SensorSupervisor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
            tripped: false,
        }
    }

    /// Record a failed read.
    pub fn record_failure(&mut self, err: SensorError) -> FaultTransition {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        warn!(
            "Sensor read failed: {err} ({}/{})",
            self.consecutive_failures, self.threshold
        );

        if !self.tripped && self.consecutive_failures >= self.threshold {
            self.tripped = true;
            error!(
                "SENSOR FAULT SET: {} consecutive failures, actuators forced off",
                self.consecutive_failures
            );
            return FaultTransition::Tripped;
        }
        FaultTransition::Unchanged
    }

    /// Record a successful read.
    pub fn record_success(&mut self) -> FaultTransition {
        self.consecutive_failures = 0;
        if self.tripped {
            self.tripped = false;
            info!("SENSOR FAULT CLEARED: readings resumed");
            return FaultTransition::Cleared;
        }
        FaultTransition::Unchanged
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_exactly_at_threshold() {
        let mut s = SensorSupervisor::new(3);
        assert_eq!(s.record_failure(SensorError::Timeout), FaultTransition::Unchanged);
        assert_eq!(s.record_failure(SensorError::BusFault), FaultTransition::Unchanged);
        assert!(!s.is_tripped());
        assert_eq!(s.record_failure(SensorError::OutOfRange), FaultTransition::Tripped);
        assert!(s.is_tripped());
        assert_eq!(s.record_failure(SensorError::Timeout), FaultTransition::Unchanged);
        assert_eq!(s.consecutive_failures(), 4);
    }

    #[test]
    fn success_resets_counter_before_threshold() {
        let mut s = SensorSupervisor::new(3);
        s.record_failure(SensorError::Timeout);
        s.record_failure(SensorError::Timeout);
        assert_eq!(s.record_success(), FaultTransition::Unchanged);
        s.record_failure(SensorError::Timeout);
        s.record_failure(SensorError::Timeout);
        assert!(!s.is_tripped());
    }

    #[test]
    fn success_clears_latched_fault() {
        let mut s = SensorSupervisor::new(1);
        assert_eq!(s.record_failure(SensorError::BusFault), FaultTransition::Tripped);
        assert_eq!(s.record_success(), FaultTransition::Cleared);
        assert!(!s.is_tripped());
        assert_eq!(s.consecutive_failures(), 0);
    }

    #[test]
    fn zero_threshold_behaves_as_one() {
        let mut s = SensorSupervisor::new(0);
        assert_eq!(s.record_failure(SensorError::Timeout), FaultTransition::Tripped);
    }
}
