//! System configuration parameters
//!
//! All tunable parameters for the thermostat.  Values come from
//! [`ThermostatConfig::default()`] or a JSON file loaded through the
//! [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::state::{Temperature, TemperatureUnit};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    // --- Set point ---
    /// Unit every set point, hysteresis and reported temperature uses.
    pub unit: TemperatureUnit,
    /// Set point at power-on.
    pub default_set_point: f32,
    /// Raise/Lower button increment.
    pub set_point_step: f32,
    pub set_point_min: f32,
    pub set_point_max: f32,

    // --- Control ---
    /// Half-width of the dead band around the set point.
    pub hysteresis: f32,
    /// Consecutive failed reads before heating/cooling are forced off.
    pub sensor_failure_threshold: u32,

    // --- Timing ---
    /// Sensor read interval (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Upper bound on a single sensor read (milliseconds)
    pub sensor_timeout_ms: u32,
    /// Button sampling interval (milliseconds)
    pub button_poll_interval_ms: u32,
    /// Lock-out window after an accepted button edge (milliseconds)
    pub debounce_ms: u32,
    /// Display heartbeat interval (milliseconds)
    pub display_refresh_interval_ms: u32,
    /// Heartbeats between flips of the second display line
    pub display_page_refreshes: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Telemetry link ---
    /// Serial device path, or `-` for stdout.
    pub telemetry_device: String,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            // Set point
            unit: TemperatureUnit::Fahrenheit,
            default_set_point: 72.0,
            set_point_step: 1.0,
            set_point_min: 50.0,
            set_point_max: 90.0,

            // Control
            hysteresis: 1.0,
            sensor_failure_threshold: 3,

            // Timing
            sensor_poll_interval_ms: 2000,    // 0.5 Hz
            sensor_timeout_ms: 500,
            button_poll_interval_ms: 20,      // 50 Hz
            debounce_ms: 200,
            display_refresh_interval_ms: 1000, // 1 Hz
            display_page_refreshes: 5,
            telemetry_interval_secs: 30,

            // Telemetry link
            telemetry_device: String::from("/dev/ttyS0"),
        }
    }
}

impl ThermostatConfig {
    /// Reject out-of-range values.  Nothing is clamped: a bad file is an
    /// operator error and must surface at startup.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.hysteresis > 0.0) {
            return Err("hysteresis must be positive");
        }
        if !(self.set_point_step > 0.0) {
            return Err("set_point_step must be positive");
        }
        if self.set_point_min >= self.set_point_max {
            return Err("set_point_min must be below set_point_max");
        }
        if self.default_set_point < self.set_point_min
            || self.default_set_point > self.set_point_max
        {
            return Err("default_set_point outside set point range");
        }
        if self.sensor_failure_threshold == 0 {
            return Err("sensor_failure_threshold must be at least 1");
        }
        if self.sensor_poll_interval_ms == 0
            || self.button_poll_interval_ms == 0
            || self.display_refresh_interval_ms == 0
            || self.telemetry_interval_secs == 0
            || self.display_page_refreshes == 0
        {
            return Err("intervals must be non-zero");
        }
        if self.sensor_timeout_ms == 0 || self.sensor_timeout_ms >= self.sensor_poll_interval_ms {
            return Err("sensor_timeout_ms must be non-zero and below sensor_poll_interval_ms");
        }
        if self.telemetry_device.is_empty() {
            return Err("telemetry_device must not be empty");
        }
        Ok(())
    }

    /// The power-on set point as a unit-tagged temperature.
    pub fn initial_set_point(&self) -> Temperature {
        Temperature::new(self.default_set_point, self.unit)
    }
}
