//! End-to-end scenarios through the shared controller, without threads.
//!
//! Inputs go in as port values; outputs are read back as queued changes
//! and projected into telemetry lines, as the output unit would.

use chrono::{TimeZone, Utc};

use thermostat::app::controller::ThermostatController;
use thermostat::app::events::ChangeCause;
use thermostat::app::shared::SharedController;
use thermostat::app::state::Temperature;
use thermostat::app::telemetry::StatusRecord;
use thermostat::config::ThermostatConfig;
use thermostat::error::SensorError;
use thermostat::fsm::{ButtonEvent, ButtonId, Mode};

fn shared_at(set_point: f32) -> SharedController {
    let config = ThermostatConfig {
        default_set_point: set_point,
        ..ThermostatConfig::default()
    };
    SharedController::new(ThermostatController::new(&config, Utc::now()).unwrap())
}

fn drain(s: &SharedController) -> Vec<ChangeCause> {
    std::iter::from_fn(|| s.next_change()).map(|c| c.cause).collect()
}

#[test]
fn heat_cycle_follows_hysteresis_band() {
    let s = shared_at(70.0);
    s.on_button_event(ButtonEvent::pressed(ButtonId::Mode), Utc::now());

    let mut heating = Vec::new();
    for t in [68.0, 71.0, 69.0] {
        s.on_temperature_sample(Ok(Temperature::fahrenheit(t)), Utc::now());
        heating.push(s.snapshot().activation.heating);
    }
    assert_eq!(heating, vec![true, false, false]);
    assert!(!s.snapshot().activation.cooling);
}

#[test]
fn three_rapid_presses_return_to_off_with_consistent_snapshots() {
    let s = shared_at(72.0);
    s.on_temperature_sample(Ok(Temperature::fahrenheit(60.0)), Utc::now());
    drain(&s);

    for _ in 0..3 {
        s.on_button_event(ButtonEvent::pressed(ButtonId::Mode), Utc::now());
    }

    let changes: Vec<_> = std::iter::from_fn(|| s.next_change()).collect();
    let modes: Vec<Mode> = changes.iter().map(|c| c.state.mode).collect();
    assert_eq!(modes, vec![Mode::Heat, Mode::Cool, Mode::Off]);
    for c in &changes {
        assert!(c.state.activation.is_consistent_with(c.state.mode));
    }
    // 60 °F is cold: heating only while in Heat.
    assert!(changes[0].state.activation.heating);
    assert!(!changes[1].state.activation.any());
}

#[test]
fn released_edges_are_ignored() {
    let s = shared_at(72.0);
    assert!(
        s.on_button_event(ButtonEvent::released(ButtonId::Mode), Utc::now())
            .is_none()
    );
    assert_eq!(s.snapshot().mode, Mode::Off);
    assert!(drain(&s).is_empty());
}

#[test]
fn consecutive_failures_force_idle_until_a_good_read() {
    let s = shared_at(72.0);
    s.on_button_event(ButtonEvent::pressed(ButtonId::Mode), Utc::now());
    s.on_temperature_sample(Ok(Temperature::fahrenheit(65.0)), Utc::now());
    assert!(s.snapshot().activation.heating);
    drain(&s);

    for err in [SensorError::Timeout, SensorError::BusFault] {
        s.on_temperature_sample(Err(err), Utc::now());
        assert!(s.snapshot().activation.heating, "below threshold keeps last decision");
    }
    s.on_temperature_sample(Err(SensorError::OutOfRange), Utc::now());
    let snap = s.snapshot();
    assert!(snap.sensor_fault);
    assert!(!snap.activation.any());
    assert_eq!(drain(&s), vec![ChangeCause::SensorFaulted]);

    // More failures keep it latched without new notifications.
    s.on_temperature_sample(Err(SensorError::Timeout), Utc::now());
    assert!(drain(&s).is_empty());

    s.on_temperature_sample(Ok(Temperature::fahrenheit(65.0)), Utc::now());
    let snap = s.snapshot();
    assert!(!snap.sensor_fault);
    assert!(snap.activation.heating);
    assert_eq!(drain(&s), vec![ChangeCause::SensorRecovered]);
}

#[test]
fn fault_is_reported_as_unknown_temperature() {
    let s = shared_at(72.0);
    s.on_temperature_sample(Ok(Temperature::fahrenheit(70.0)), Utc::now());
    for _ in 0..3 {
        s.on_temperature_sample(Err(SensorError::Timeout), Utc::now());
    }
    let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let line = StatusRecord::from_state(&s.snapshot(), at).to_string();
    assert_eq!(line, "2026-10-19T12:00:00Z,OFF,unknown,false,false");
}

#[test]
fn cooling_status_line() {
    let s = shared_at(72.0);
    s.on_button_event(ButtonEvent::pressed(ButtonId::Mode), Utc::now());
    s.on_button_event(ButtonEvent::pressed(ButtonId::Mode), Utc::now());
    s.on_temperature_sample(Ok(Temperature::fahrenheit(75.2)), Utc::now());

    let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let line = StatusRecord::from_state(&s.snapshot(), at).to_string();
    assert_eq!(line, "2026-10-19T12:00:00Z,COOL,75.2,false,true");
    assert_eq!(line.split(',').count(), 5);
}

#[test]
fn set_point_buttons_respect_range() {
    let config = ThermostatConfig {
        default_set_point: 89.0,
        ..ThermostatConfig::default()
    };
    let s = SharedController::new(ThermostatController::new(&config, Utc::now()).unwrap());

    s.on_button_event(ButtonEvent::pressed(ButtonId::Raise), Utc::now());
    assert!(
        s.on_button_event(ButtonEvent::pressed(ButtonId::Raise), Utc::now())
            .is_none()
    );
    assert_eq!(s.snapshot().set_point.degrees, 90.0);

    s.on_button_event(ButtonEvent::pressed(ButtonId::Lower), Utc::now());
    assert_eq!(s.snapshot().set_point.degrees, 89.0);
    assert_eq!(
        drain(&s),
        vec![
            ChangeCause::SetPointChanged { from: 89.0, to: 90.0 },
            ChangeCause::SetPointChanged { from: 90.0, to: 89.0 },
        ]
    );
}
