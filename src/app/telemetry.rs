//! Telemetry status records and their line format.
//!
//! One record per line, five comma-separated fields in a fixed order:
//!
//! ```text
//! timestamp,mode,temperature,heating_active,cooling_active
//! 2026-10-19T12:00:00Z,COOL,75.2,false,true
//! ```
//!
//! | Field            | Format                                        |
//! |------------------|-----------------------------------------------|
//! | `timestamp`      | RFC 3339, UTC, whole seconds                  |
//! | `mode`           | `OFF`, `HEAT` or `COOL`                       |
//! | `temperature`    | one decimal in the configured unit, `unknown` |
//! | `heating_active` | `true` / `false`                              |
//! | `cooling_active` | `true` / `false`                              |

use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::state::ThermostatState;
use crate::fsm::Mode;

/// Field names in wire order.
pub const FIELDS: [&str; 5] = [
    "timestamp",
    "mode",
    "temperature",
    "heating_active",
    "cooling_active",
];

const DELIMITER: char = ',';
const UNKNOWN: &str = "unknown";

/// Serialisable point-in-time status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusRecord {
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    pub temperature: Option<f32>,
    pub heating_active: bool,
    pub cooling_active: bool,
}

impl StatusRecord {
    /// Project a snapshot.  The temperature is reported as unknown while
    /// the sensor fault fallback is latched.
    pub fn from_state(state: &ThermostatState, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            mode: state.mode,
            temperature: state.trusted_temperature().map(|t| t.degrees),
            heating_active: state.activation.heating,
            cooling_active: state.activation.cooling,
        }
    }

    /// Parse one line (trailing newline tolerated).
    pub fn parse_line(line: &str) -> Result<Self, RecordParseError> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(DELIMITER);
        let mut next = || fields.next().ok_or(RecordParseError::FieldCount);

        let timestamp = DateTime::parse_from_rfc3339(next()?)
            .map_err(|_| RecordParseError::Timestamp)?
            .with_timezone(&Utc);
        let mode = Mode::from_label(next()?).ok_or(RecordParseError::Mode)?;
        let temperature = match next()? {
            UNKNOWN => None,
            raw => Some(
                raw.parse::<f32>()
                    .map_err(|_| RecordParseError::Temperature)?,
            ),
        };
        let heating_active = parse_flag(next()?)?;
        let cooling_active = parse_flag(next()?)?;

        if fields.next().is_some() {
            return Err(RecordParseError::FieldCount);
        }

        Ok(Self {
            timestamp,
            mode,
            temperature,
            heating_active,
            cooling_active,
        })
    }
}

impl fmt::Display for StatusRecord {
    /// The wire form, without the line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.mode
        )?;
        match self.temperature {
            Some(t) => write!(f, "{t:.1}")?,
            None => f.write_str(UNKNOWN)?,
        }
        write!(
            f,
            "{DELIMITER}{}{DELIMITER}{}",
            self.heating_active, self.cooling_active
        )
    }
}

fn parse_flag(raw: &str) -> Result<bool, RecordParseError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RecordParseError::Flag),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordParseError {
    FieldCount,
    Timestamp,
    Mode,
    Temperature,
    Flag,
}

impl fmt::Display for RecordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount => write!(f, "expected {} fields", FIELDS.len()),
            Self::Timestamp => write!(f, "bad timestamp"),
            Self::Mode => write!(f, "bad mode"),
            Self::Temperature => write!(f, "bad temperature"),
            Self::Flag => write!(f, "bad boolean flag"),
        }
    }
}
