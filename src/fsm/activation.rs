//! Heating/cooling activation policy.
//!
//! Activation is not a state machine of its own: it is recomputed from
//! (mode, temperature, set point, previous activation) every time one of
//! those inputs changes.  The previous activation is what gives the policy
//! its hysteresis:
//!
//! ```text
//!   Heat:   on  when t <  s - h      Cool:   on  when t >  s + h
//!           off when t >= s + h              off when t <= s - h
//!           otherwise hold                   otherwise hold
//! ```

use serde::{Deserialize, Serialize};

use super::Mode;

/// Whether each actuator should currently run.  Never both `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Activation {
    pub heating: bool,
    pub cooling: bool,
}

impl Activation {
    pub const IDLE: Self = Self {
        heating: false,
        cooling: false,
    };

    /// True if either actuator is running.
    pub const fn any(self) -> bool {
        self.heating || self.cooling
    }

    /// Whether this activation is one the policy could ever produce for
    /// `mode`.
    pub const fn is_consistent_with(self, mode: Mode) -> bool {
        match mode {
            Mode::Off => !self.heating && !self.cooling,
            Mode::Heat => !self.cooling,
            Mode::Cool => !self.heating,
        }
    }
}

/// Band parameters, both in the controller's configured unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub set_point: f32,
    pub hysteresis: f32,
}

impl Band {
    fn lower(self) -> f32 {
        self.set_point - self.hysteresis
    }

    fn upper(self) -> f32 {
        self.set_point + self.hysteresis
    }
}

/// Compute the next activation.
///
/// `temperature` is `None` when no trustworthy reading exists (never read,
/// or the sensor fault fallback has tripped); both actuators are then off.
pub fn evaluate(
    mode: Mode,
    temperature: Option<f32>,
    band: Band,
    previous: Activation,
) -> Activation {
    let Some(t) = temperature else {
        return Activation::IDLE;
    };

    match mode {
        Mode::Off => Activation::IDLE,
        Mode::Heat => {
            let heating = if previous.heating {
                t < band.upper()
            } else {
                t < band.lower()
            };
            Activation {
                heating,
                cooling: false,
            }
        }
        Mode::Cool => {
            let cooling = if previous.cooling {
                t > band.lower()
            } else {
                t > band.upper()
            };
            Activation {
                heating: false,
                cooling,
            }
        }
    }
}
