//! Outbound change notifications.
//!
//! Every effective mutation of the controller yields one [`StateChange`]:
//! the cause plus the post-change snapshot captured in the same critical
//! section as the mutation.  The output unit renders and reports from the
//! snapshot it carries, never from a second read.

use super::state::ThermostatState;
use crate::fsm::Mode;

/// What made the state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeCause {
    /// The mode button advanced the cycle.
    ModeChanged { from: Mode, to: Mode },
    /// Raise/Lower moved the set point (degrees in the configured unit).
    SetPointChanged { from: f32, to: f32 },
    /// A new reading flipped heating or cooling.
    ActivationChanged,
    /// The consecutive-failure fallback latched.
    SensorFaulted,
    /// A successful read cleared the fallback.
    SensorRecovered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange {
    pub cause: ChangeCause,
    pub state: ThermostatState,
}
