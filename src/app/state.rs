//! Thermostat state model.
//!
//! [`ThermostatState`] is the one piece of shared mutable data in the
//! system.  It is only ever handed out as a `Copy` snapshot, so a reader
//! holds either the whole pre-change or the whole post-change state.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fsm::Mode;
use crate::fsm::activation::Activation;

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    /// Single-letter suffix for the character display.
    pub const fn symbol(self) -> char {
        match self {
            Self::Fahrenheit => 'F',
            Self::Celsius => 'C',
        }
    }
}

/// A unit-tagged temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub degrees: f32,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub const fn new(degrees: f32, unit: TemperatureUnit) -> Self {
        Self { degrees, unit }
    }

    pub const fn fahrenheit(degrees: f32) -> Self {
        Self::new(degrees, TemperatureUnit::Fahrenheit)
    }

    pub const fn celsius(degrees: f32) -> Self {
        Self::new(degrees, TemperatureUnit::Celsius)
    }

    /// Convert to `unit`.
    pub fn to(self, unit: TemperatureUnit) -> Self {
        let degrees = match (self.unit, unit) {
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => {
                (self.degrees - 32.0) * 5.0 / 9.0
            }
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => {
                self.degrees * 9.0 / 5.0 + 32.0
            }
            _ => self.degrees,
        };
        Self { degrees, unit }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}{}", self.degrees, self.unit.symbol())
    }
}

// ---------------------------------------------------------------------------
// ThermostatState
// ---------------------------------------------------------------------------

/// Consistent snapshot of everything the controller owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermostatState {
    pub mode: Mode,
    /// Last successful reading in the configured unit; `None` until the
    /// first read succeeds.
    pub current_temperature: Option<Temperature>,
    pub set_point: Temperature,
    pub activation: Activation,
    /// The consecutive-failure fallback has tripped; `current_temperature`
    /// is stale and activation is forced off.
    pub sensor_fault: bool,
    pub consecutive_failures: u32,
    pub last_updated: DateTime<Utc>,
}

impl ThermostatState {
    /// Power-on state: mode Off, temperature unknown.
    pub fn initial(set_point: Temperature, now: DateTime<Utc>) -> Self {
        Self {
            mode: Mode::Off,
            current_temperature: None,
            set_point,
            activation: Activation::IDLE,
            sensor_fault: false,
            consecutive_failures: 0,
            last_updated: now,
        }
    }

    /// The temperature safe to act on or report: unknown while the sensor
    /// fault is latched.
    pub fn trusted_temperature(&self) -> Option<Temperature> {
        if self.sensor_fault {
            None
        } else {
            self.current_temperature
        }
    }
}
