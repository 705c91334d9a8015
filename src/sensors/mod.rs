//! Temperature sources implementing [`SensorPort`](crate::app::ports::SensorPort).
//!
//! [`aht20`] talks to real hardware through `embedded-hal`, [`simulated`]
//! stands in for it on a host, and [`bounded`] wraps either so a wedged
//! read costs the sensor unit one timeout instead of the thread.

pub mod aht20;
pub mod bounded;
pub mod simulated;

pub use aht20::Aht20;
pub use bounded::BoundedSensor;
pub use simulated::{SimPlant, SimSensor};
