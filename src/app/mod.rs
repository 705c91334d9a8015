//! Application core: thermostat domain logic with no I/O.
//!
//! The controller, its state snapshot and the projections derived from it
//! (display frame, telemetry record) live here.  All interaction with
//! hardware happens through the **port traits** in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod controller;
pub mod display;
pub mod events;
pub mod ports;
pub mod shared;
pub mod state;
pub mod telemetry;
