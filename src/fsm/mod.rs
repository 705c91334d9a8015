//! Mode state machine.
//!
//! Three states, cyclic, advanced only by the rising edge of the mode
//! button:
//!
//! ```text
//!        Pressed            Pressed            Pressed
//!  ┌─────┐ ───────▶ ┌──────┐ ───────▶ ┌──────┐ ───────▶ ┌─────┐
//!  │ Off │          │ Heat │          │ Cool │          │ Off │ …
//!  └─────┘          └──────┘          └──────┘          └─────┘
//! ```
//!
//! The transition table is the pure function [`transition`]; everything
//! that depends on temperature lives in [`activation`].

pub mod activation;

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Operating selection.  Determines the indicator and which comparison the
/// activation policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Off,
    Heat,
    Cool,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Off, Mode::Heat, Mode::Cool];

    /// The next mode in the cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::Heat,
            Self::Heat => Self::Cool,
            Self::Cool => Self::Off,
        }
    }

    /// Stable upper-case label used on the display and the telemetry wire.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Button events
// ---------------------------------------------------------------------------

/// Physical buttons on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    /// Cycles Off → Heat → Cool.
    Mode,
    /// Raises the set point by one step.
    Raise,
    /// Lowers the set point by one step.
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Pressed,
    Released,
}

/// A debounced edge from the button port.  Consumed once, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub id: ButtonId,
    pub edge: Edge,
}

impl ButtonEvent {
    pub const fn pressed(id: ButtonId) -> Self {
        Self {
            id,
            edge: Edge::Pressed,
        }
    }

    pub const fn released(id: ButtonId) -> Self {
        Self {
            id,
            edge: Edge::Released,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

/// Mode transition table.  Only a `Pressed` edge on the mode button moves
/// the machine; everything else maps a mode to itself.
pub const fn transition(mode: Mode, event: ButtonEvent) -> Mode {
    match (event.id, event.edge) {
        (ButtonId::Mode, Edge::Pressed) => mode.next(),
        (ButtonId::Mode, Edge::Released) | (ButtonId::Raise | ButtonId::Lower, _) => mode,
    }
}
