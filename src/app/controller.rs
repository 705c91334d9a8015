//! Thermostat controller: the hexagonal core.
//!
//! [`ThermostatController`] owns the mode, set point, last-known
//! temperature, activation and the sensor fault supervisor.  It performs
//! no I/O: inputs arrive as values, and every effective change comes back
//! as a [`StateChange`] for the caller to route to the output ports.
//!
//! ```text
//!  ButtonEvent ──▶ ┌──────────────────────────┐ ──▶ StateChange
//!                  │   ThermostatController   │       (cause + snapshot)
//!  Temp sample ──▶ │  mode FSM · hysteresis   │
//!                  │  sensor fault supervisor │ ──▶ snapshot()
//!                  └──────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::events::{ChangeCause, StateChange};
use super::state::{Temperature, TemperatureUnit, ThermostatState};
use crate::config::ThermostatConfig;
use crate::error::{self, Error, SensorError};
use crate::fsm::activation::{self, Band};
use crate::fsm::{self, ButtonEvent, ButtonId, Edge};
use crate::safety::{FaultTransition, SensorSupervisor};

pub struct ThermostatController {
    state: ThermostatState,
    unit: TemperatureUnit,
    hysteresis: f32,
    set_point_step: f32,
    set_point_min: f32,
    set_point_max: f32,
    supervisor: SensorSupervisor,
}

impl ThermostatController {
    /// Power-on controller: mode Off, temperature unknown.
    ///
    /// The set point range and step come straight from `config`, so it is
    /// validated here; an inverted range is refused instead of surfacing
    /// later on a button press.
    pub fn new(config: &ThermostatConfig, now: DateTime<Utc>) -> error::Result<Self> {
        config.validate().map_err(Error::Config)?;
        Ok(Self {
            state: ThermostatState::initial(config.initial_set_point(), now),
            unit: config.unit,
            hysteresis: config.hysteresis,
            set_point_step: config.set_point_step,
            set_point_min: config.set_point_min,
            set_point_max: config.set_point_max,
            supervisor: SensorSupervisor::new(config.sensor_failure_threshold),
        })
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Apply one debounced button edge.
    ///
    /// Only `Pressed` edges act.  The mode button advances the cycle;
    /// Raise/Lower move the set point one step within its range.  Either
    /// recomputes activation against the current (possibly stale)
    /// temperature.
    pub fn on_button_event(
        &mut self,
        event: ButtonEvent,
        now: DateTime<Utc>,
    ) -> Option<StateChange> {
        if event.edge == Edge::Released {
            return None;
        }

        let cause = match event.id {
            ButtonId::Mode => {
                let from = self.state.mode;
                let to = fsm::transition(from, event);
                self.state.mode = to;
                info!("Mode: {} -> {}", from, to);
                ChangeCause::ModeChanged { from, to }
            }
            ButtonId::Raise | ButtonId::Lower => {
                let from = self.state.set_point.degrees;
                let delta = if event.id == ButtonId::Raise {
                    self.set_point_step
                } else {
                    -self.set_point_step
                };
                let to = (from + delta).clamp(self.set_point_min, self.set_point_max);
                if (to - from).abs() < f32::EPSILON {
                    debug!("Set point already at limit ({:.1})", from);
                    return None;
                }
                self.state.set_point.degrees = to;
                info!("Set point: {:.1} -> {:.1}", from, to);
                ChangeCause::SetPointChanged { from, to }
            }
        };

        self.recompute_activation();
        self.state.last_updated = now;
        Some(StateChange {
            cause,
            state: self.state,
        })
    }

    /// Apply one sensor read result.
    ///
    /// A success stores the reading and clears any latched fault.  A
    /// failure keeps the last known temperature and counts towards the
    /// fallback threshold.  Returns a change only when activation or the
    /// fault flag moved; plain temperature drift is picked up by the
    /// display heartbeat.
    pub fn on_temperature_sample(
        &mut self,
        sample: Result<Temperature, SensorError>,
        now: DateTime<Utc>,
    ) -> Option<StateChange> {
        let previous = self.state.activation;

        let fault = match sample {
            Ok(reading) => {
                let reading = reading.to(self.unit);
                debug!("Sample: {}", reading);
                self.state.current_temperature = Some(reading);
                self.supervisor.record_success()
            }
            Err(e) => self.supervisor.record_failure(e),
        };
        self.state.sensor_fault = self.supervisor.is_tripped();
        self.state.consecutive_failures = self.supervisor.consecutive_failures();

        self.recompute_activation();
        self.state.last_updated = now;

        let cause = match fault {
            FaultTransition::Tripped => ChangeCause::SensorFaulted,
            FaultTransition::Cleared => ChangeCause::SensorRecovered,
            FaultTransition::Unchanged if self.state.activation != previous => {
                info!(
                    "Activation: heating={} cooling={}",
                    self.state.activation.heating, self.state.activation.cooling
                );
                ChangeCause::ActivationChanged
            }
            FaultTransition::Unchanged => return None,
        };

        Some(StateChange {
            cause,
            state: self.state,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current state as a consistent copy.
    pub fn snapshot(&self) -> ThermostatState {
        self.state
    }

    // ── Internal ──────────────────────────────────────────────

    fn recompute_activation(&mut self) {
        let band = Band {
            set_point: self.state.set_point.degrees,
            hysteresis: self.hysteresis,
        };
        let temperature = self.state.trusted_temperature().map(|t| t.degrees);
        self.state.activation =
            activation::evaluate(self.state.mode, temperature, band, self.state.activation);
    }
}
