//! Threaded runtime against mock ports.
//!
//! Cadences are shortened and every wait is bounded by a generous
//! deadline, so the assertions hold on a loaded CI host.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::mock_hw::{
    wait_for, OutputCall, QueuedButtons, RecordingOutput, RecordingTelemetry, ScriptedSensor,
    WallClock,
};
use thermostat::app::controller::ThermostatController;
use thermostat::app::shared::SharedController;
use thermostat::config::ThermostatConfig;
use thermostat::error::{Error, SensorError};
use thermostat::fsm::{ButtonEvent, ButtonId, Mode};
use thermostat::runtime::{Ports, Runtime};

const DEADLINE: Duration = Duration::from_secs(5);

fn fast_config() -> ThermostatConfig {
    ThermostatConfig {
        sensor_poll_interval_ms: 40,
        sensor_timeout_ms: 20,
        button_poll_interval_ms: 5,
        display_refresh_interval_ms: 30,
        display_page_refreshes: 2,
        // Periodic reports off the test's timescale unless asked for.
        telemetry_interval_secs: 3600,
        ..ThermostatConfig::default()
    }
}

struct Rig {
    runtime: Runtime,
    shared: Arc<SharedController>,
    sensor: ScriptedSensor,
    buttons: QueuedButtons,
    output: RecordingOutput,
    telemetry: RecordingTelemetry,
}

fn start(sensor: ScriptedSensor) -> Rig {
    start_with(&fast_config(), sensor)
}

fn start_with(config: &ThermostatConfig, sensor: ScriptedSensor) -> Rig {
    let shared = Arc::new(SharedController::new(ThermostatController::new(
        config,
        Utc::now(),
    )
    .unwrap()));
    let buttons = QueuedButtons::new();
    let output = RecordingOutput::new();
    let telemetry = RecordingTelemetry::new();
    let runtime = Runtime::start(
        config,
        Arc::clone(&shared),
        Ports {
            sensor: sensor.clone(),
            buttons: buttons.clone(),
            output: output.clone(),
            telemetry: telemetry.clone(),
        },
        Arc::new(WallClock),
    )
    .unwrap();
    Rig {
        runtime,
        shared,
        sensor,
        buttons,
        output,
        telemetry,
    }
}

fn press(rig: &Rig, id: ButtonId) {
    rig.buttons.push(ButtonEvent::pressed(id));
    rig.buttons.push(ButtonEvent::released(id));
}

#[test]
fn mode_presses_reach_telemetry_in_order() {
    let rig = start(ScriptedSensor::fahrenheit(72.0));
    assert!(wait_for(DEADLINE, || !rig.telemetry.records().is_empty()));
    for _ in 0..3 {
        press(&rig, ButtonId::Mode);
    }

    assert!(wait_for(DEADLINE, || rig.telemetry.mode_sequence().len() >= 4));
    assert_eq!(
        rig.telemetry.mode_sequence(),
        vec![Mode::Off, Mode::Heat, Mode::Cool, Mode::Off]
    );
    for r in rig.telemetry.records() {
        assert!(!(r.heating_active && r.cooling_active));
    }
    rig.runtime.shutdown();
}

#[test]
fn heating_follows_sensor_through_output_port() {
    let rig = start(ScriptedSensor::fahrenheit(60.0));
    press(&rig, ButtonId::Mode);

    assert!(wait_for(DEADLINE, || rig.output.saw_indicator(Mode::Heat, true)));

    rig.sensor.set_fahrenheit(80.0);
    assert!(wait_for(DEADLINE, || {
        matches!(
            rig.output.calls().iter().rev().find(|c| matches!(c, OutputCall::Indicator { .. })),
            Some(OutputCall::Indicator { mode: Mode::Heat, active: false })
        )
    }));
    assert!(!rig.shared.snapshot().activation.heating);
    rig.runtime.shutdown();
}

#[test]
fn sensor_fault_latches_and_recovers() {
    let rig = start(ScriptedSensor::fahrenheit(60.0));
    press(&rig, ButtonId::Mode);
    assert!(wait_for(DEADLINE, || rig.shared.snapshot().activation.heating));

    rig.sensor.set(Err(SensorError::BusFault));
    assert!(wait_for(DEADLINE, || rig.shared.snapshot().sensor_fault));
    assert!(!rig.shared.snapshot().activation.any());
    assert!(wait_for(DEADLINE, || {
        rig.telemetry
            .records()
            .iter()
            .any(|r| r.temperature.is_none() && r.mode == Mode::Heat && !r.heating_active)
    }));

    rig.sensor.set_fahrenheit(60.0);
    assert!(wait_for(DEADLINE, || {
        let s = rig.shared.snapshot();
        !s.sensor_fault && s.activation.heating
    }));
    rig.runtime.shutdown();
}

#[test]
fn wedged_sensor_does_not_block_buttons() {
    let sensor = ScriptedSensor::fahrenheit(70.0);
    sensor.set_latency_ms(2_000);
    let rig = start(sensor);

    let started = Instant::now();
    press(&rig, ButtonId::Mode);
    assert!(wait_for(DEADLINE, || rig.shared.snapshot().mode == Mode::Heat));
    assert!(started.elapsed() < Duration::from_secs(2));

    // Every poll times out, so the fallback latches well before the
    // first read completes.
    assert!(wait_for(DEADLINE, || rig.shared.snapshot().sensor_fault));
    rig.runtime.shutdown();
}

#[test]
fn telemetry_failures_are_dropped_without_stalling_output() {
    let rig = start(ScriptedSensor::fahrenheit(60.0));
    rig.telemetry.set_failing(true);
    press(&rig, ButtonId::Mode);

    assert!(wait_for(DEADLINE, || rig.output.saw_indicator(Mode::Heat, true)));
    assert!(rig.telemetry.attempts() >= 2);
    assert!(rig.telemetry.records().is_empty());
    rig.runtime.shutdown();
}

#[test]
fn periodic_reports_continue_without_changes() {
    let config = ThermostatConfig {
        telemetry_interval_secs: 1,
        ..fast_config()
    };
    let rig = start_with(&config, ScriptedSensor::fahrenheit(72.0));
    assert!(wait_for(DEADLINE, || rig.telemetry.records().len() >= 3));

    let records = rig.telemetry.records();
    assert!(records.iter().all(|r| r.mode == Mode::Off));
    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    rig.runtime.shutdown();
}

#[test]
fn display_alternates_pages() {
    let rig = start(ScriptedSensor::fahrenheit(68.5));
    assert!(wait_for(DEADLINE, || {
        let lines = rig.output.rendered_line2();
        lines.iter().any(|l| l == "OFF 72F") && lines.iter().any(|l| l == "Temp:68.5F")
    }));
    rig.runtime.shutdown();
}

#[test]
fn shutdown_blanks_the_panel_last() {
    let rig = start(ScriptedSensor::fahrenheit(70.0));
    assert!(wait_for(DEADLINE, || !rig.output.calls().is_empty()));

    let output = rig.output.clone();
    rig.runtime.shutdown();
    assert_eq!(output.calls().last(), Some(&OutputCall::Blank));
}

#[test]
fn raise_and_lower_move_set_point() {
    let rig = start(ScriptedSensor::fahrenheit(70.0));
    press(&rig, ButtonId::Raise);
    press(&rig, ButtonId::Raise);
    press(&rig, ButtonId::Lower);

    assert!(wait_for(DEADLINE, || rig.buttons.is_drained()));
    assert!(wait_for(DEADLINE, || rig.shared.snapshot().set_point.degrees == 73.0));
    assert!(wait_for(DEADLINE, || rig.sensor.reads() > 0));
    rig.runtime.shutdown();
}

#[test]
fn invalid_config_is_refused() {
    let config = ThermostatConfig {
        sensor_timeout_ms: 5_000,
        ..fast_config()
    };
    let shared = Arc::new(SharedController::new(ThermostatController::new(
        &ThermostatConfig::default(),
        Utc::now(),
    )
    .unwrap()));
    let result = Runtime::start(
        &config,
        shared,
        Ports {
            sensor: ScriptedSensor::fahrenheit(70.0),
            buttons: QueuedButtons::new(),
            output: RecordingOutput::new(),
            telemetry: RecordingTelemetry::new(),
        },
        Arc::new(WallClock),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
