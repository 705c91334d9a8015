//! Console front panel.
//!
//! Implements [`OutputPort`] by logging what a 16x2 LCD and the two mode
//! LEDs would show.  Nothing is logged when an update repeats the current
//! output, so the once-a-second display heartbeat stays quiet until the
//! clock line actually changes.
//!
//! | LED    | Mode | Pattern                                 |
//! |--------|------|-----------------------------------------|
//! | red    | Heat | solid while idle, pulsing while heating |
//! | blue   | Cool | solid while idle, pulsing while cooling |
//!
//! When a [`SimPlant`] is attached the indicator state also switches the
//! simulated furnace and air conditioner.

use log::{debug, info};

use crate::app::display::DisplayState;
use crate::app::ports::OutputPort;
use crate::fsm::Mode;
use crate::sensors::SimPlant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Off,
    Solid,
    Pulsing,
}

impl Led {
    fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Solid => "solid",
            Self::Pulsing => "pulsing",
        }
    }
}

pub struct ConsolePanel {
    frame: DisplayState,
    red: Led,
    blue: Led,
    plant: Option<SimPlant>,
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self {
            frame: DisplayState::blank(),
            red: Led::Off,
            blue: Led::Off,
            plant: None,
        }
    }

    /// Drive `plant` from the indicator state.
    pub fn with_plant(mut self, plant: SimPlant) -> Self {
        self.plant = Some(plant);
        self
    }
}

impl OutputPort for ConsolePanel {
    fn set_indicator(&mut self, mode: Mode, active: bool) {
        let lit = if active { Led::Pulsing } else { Led::Solid };
        let (red, blue) = match mode {
            Mode::Off => (Led::Off, Led::Off),
            Mode::Heat => (lit, Led::Off),
            Mode::Cool => (Led::Off, lit),
        };

        if let Some(plant) = &self.plant {
            plant.drive(red == Led::Pulsing, blue == Led::Pulsing);
        }

        if (red, blue) != (self.red, self.blue) {
            self.red = red;
            self.blue = blue;
            info!("LED | red={} blue={}", red.label(), blue.label());
        }
    }

    fn render_display(&mut self, display: &DisplayState) {
        if *display != self.frame {
            self.frame = display.clone();
            debug!("LCD | {}", self.frame);
        }
    }

    fn blank(&mut self) {
        self.set_indicator(Mode::Off, false);
        self.render_display(&DisplayState::blank());
        info!("Panel blanked");
    }
}
