//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   SensorPort ─┐                         ┌─▶ OutputPort
//!               ├─▶ ThermostatController ─┤
//!   ButtonPort ─┘                         └─▶ TelemetryPort
//! ```
//!
//! Driven adapters (sensor bus, GPIO, LCD, serial line) implement these
//! traits.  Every port call is blocking at the boundary, so the runtime
//! gives each port its own execution unit.  The controller itself never
//! sees a port.

use chrono::{DateTime, Utc};

use super::display::DisplayState;
use super::state::Temperature;
use super::telemetry::StatusRecord;
use crate::config::ThermostatConfig;
use crate::error::{SensorError, TelemetryError};
use crate::fsm::{ButtonEvent, Mode};

/// Most edges a single poll can report (press + release on every button).
pub const MAX_EDGES_PER_POLL: usize = 6;

pub type Edges = heapless::Vec<ButtonEvent, MAX_EDGES_PER_POLL>;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Take one reading.  Implementations report their own unit; the
    /// controller converts.
    fn read_temperature(&mut self) -> Result<Temperature, SensorError>;
}

impl<S: SensorPort + ?Sized> SensorPort for Box<S> {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        (**self).read_temperature()
    }
}

// ───────────────────────────────────────────────────────────────
// Button port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait ButtonPort {
    /// Debounced edges observed since the previous poll, oldest first.
    /// A port-level fault is reported as "no edges".
    fn poll_edges(&mut self) -> Edges;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → LEDs + display)
// ───────────────────────────────────────────────────────────────

pub trait OutputPort {
    /// Show the selected mode; `active` is true while the matching
    /// actuator runs.  Idempotent.
    fn set_indicator(&mut self, mode: Mode, active: bool);

    /// Overwrite the whole display.  Idempotent.
    fn render_display(&mut self, display: &DisplayState);

    /// Clear the display and extinguish all indicators.
    fn blank(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → serial line)
// ───────────────────────────────────────────────────────────────

/// One-way, best-effort.  Callers log and drop errors; nothing is retried.
pub trait TelemetryPort {
    fn emit(&mut self, record: &StatusRecord) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting and after loading.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`], not
/// silently clamped.
pub trait ConfigPort {
    /// Load configuration.  [`ConfigError::NotFound`] if nothing is stored.
    fn load(&self) -> Result<ThermostatConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ThermostatConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config stored (first boot).
    NotFound,
    /// Stored config failed to deserialise.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
