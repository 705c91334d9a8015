//! Fuzz target: config file parsing + controller construction
//!
//! Arbitrary JSON is deserialised into `ThermostatConfig`.  Construction
//! must succeed exactly when `validate()` does, and the resulting
//! controller must keep its set point in range and its activation
//! consistent under a burst of inputs.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use thermostat::app::controller::ThermostatController;
use thermostat::app::state::Temperature;
use thermostat::config::ThermostatConfig;
use thermostat::error::SensorError;
use thermostat::fsm::{ButtonEvent, ButtonId};

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<ThermostatConfig>(data) else {
        return;
    };
    let now = Utc::now();
    let built = ThermostatController::new(&config, now);
    assert_eq!(built.is_ok(), config.validate().is_ok());
    let Ok(mut c) = built else {
        return;
    };
    let base = config.default_set_point;
    for (i, id) in [ButtonId::Mode, ButtonId::Raise, ButtonId::Lower]
        .into_iter()
        .cycle()
        .take(12)
        .enumerate()
    {
        c.on_button_event(ButtonEvent::pressed(id), now);
        let sample = if i % 4 == 3 {
            Err(SensorError::Timeout)
        } else {
            Ok(Temperature::new(base + i as f32 - 6.0, config.unit))
        };
        c.on_temperature_sample(sample, now);

        let s = c.snapshot();
        assert!(s.activation.is_consistent_with(s.mode));
        assert!(s.set_point.degrees >= config.set_point_min);
        assert!(s.set_point.degrees <= config.set_point_max);
    }
});
