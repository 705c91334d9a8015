//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements    | Connects to                   |
//! |---------------|---------------|-------------------------------|
//! | `config_file` | ConfigPort    | JSON file on disk             |
//! | `console`     | OutputPort    | Log output (LCD + LED mirror) |
//! | `serial`      | TelemetryPort | Serial device, stdout         |
//! | `time`        | Clock         | System clock                  |
//!
//! Sensor and button adapters live under [`crate::sensors`] and
//! [`crate::drivers`].

pub mod config_file;
pub mod console;
pub mod serial;
pub mod time;
