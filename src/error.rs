//! Unified error types for the thermostat.
//!
//! `Error` covers what can stop the thermostat from starting.  Per-read
//! and per-write failures after startup have their own types and are
//! recovered where they occur.  All variants are `Copy` so they can be
//! passed through the controller and the execution units without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A port could not be brought up at startup.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Failure of a single temperature read.  Always recovered locally by the
/// controller; never fatal after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The read did not complete within the configured bound.
    Timeout,
    /// The bus reported an error (NACK, busy device, disconnected worker).
    BusFault,
    /// The device answered with a physically implausible value.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "read timed out"),
            Self::BusFault => write!(f, "bus fault"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

/// Telemetry write failures are swallowed by the output unit; this type
/// only exists so adapters can report what went wrong for the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// The underlying writer returned an I/O error.
    WriteFailed,
    /// The link is gone (device unplugged, pipe closed).
    Disconnected,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write failed"),
            Self::Disconnected => write!(f, "link disconnected"),
        }
    }
}

impl std::error::Error for TelemetryError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
