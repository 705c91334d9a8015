//! Character display projection.
//!
//! A [`DisplayState`] is derived from a snapshot for a 16x2 character LCD
//! and never mutated afterwards; every refresh builds a fresh one.
//!
//! ```text
//! ┌────────────────┐
//! │10/19 12:00:00  │  line 1: local date and time
//! │Temp:72.3F      │  line 2: Temperature page ...
//! └────────────────┘
//! ┌────────────────┐
//! │10/19 12:00:05  │
//! │HEAT 72F        │  ... or Status page (mode + set point)
//! └────────────────┘
//! ```

use core::fmt::{self, Write as _};

use chrono::{DateTime, TimeZone};
use heapless::String;

use super::state::ThermostatState;

/// Characters per display line.
pub const DISPLAY_COLUMNS: usize = 16;

pub type Line = String<DISPLAY_COLUMNS>;

/// Which projection line 2 shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPage {
    #[default]
    Status,
    Temperature,
}

impl DisplayPage {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Status => Self::Temperature,
            Self::Temperature => Self::Status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub line1: Line,
    pub line2: Line,
}

impl DisplayState {
    pub fn project<Tz>(state: &ThermostatState, now: &DateTime<Tz>, page: DisplayPage) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let line1 = truncated(format_args!("{}", now.format("%m/%d %H:%M:%S")));

        let unit = state.set_point.unit.symbol();
        let line2 = match page {
            DisplayPage::Temperature => match state.trusted_temperature() {
                Some(t) => truncated(format_args!("Temp:{:.1}{unit}", t.degrees)),
                None => truncated(format_args!("Temp:--.-{unit}")),
            },
            DisplayPage::Status => {
                let degrees = state.set_point.degrees;
                // Whole set points stay short; fractional steps keep their tenth.
                if (degrees - degrees.round()).abs() < 0.05 {
                    truncated(format_args!("{} {:.0}{unit}", state.mode, degrees))
                } else {
                    truncated(format_args!("{} {:.1}{unit}", state.mode, degrees))
                }
            }
        };

        Self { line1, line2 }
    }

    /// Both lines empty; what a cleared panel shows.
    pub fn blank() -> Self {
        Self {
            line1: Line::new(),
            line2: Line::new(),
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:<16}|{:<16}]", self.line1.as_str(), self.line2.as_str())
    }
}

/// Format into a line, dropping whatever does not fit.
fn truncated(args: fmt::Arguments<'_>) -> Line {
    struct Clip<'a>(&'a mut Line);

    impl fmt::Write for Clip<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut line = Line::new();
    let _ = Clip(&mut line).write_fmt(args);
    line
}
