//! Thermostat host entry point.
//!
//! Wires the threaded runtime to simulation adapters so the controller can
//! be exercised from a terminal.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimSensor        ButtonBank<SimPin>   ConsolePanel            │
//! │  (SensorPort)     (ButtonPort)         (OutputPort)            │
//! │  SerialTelemetry  FileConfigStore      SystemClock             │
//! │  (TelemetryPort)  (ConfigPort)         (Clock)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │         SharedController → ThermostatController        │    │
//! │  │  mode FSM · hysteresis · sensor fault supervisor       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Runtime: sensor · buttons · output units                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `thermostat [CONFIG.json]`, then type a key and Enter:
//!
//! | Key | Action                         |
//! |-----|--------------------------------|
//! | `m` | press Mode                     |
//! | `+` | press Raise                    |
//! | `-` | press Lower                    |
//! | `f` | fail the next sensor reads     |
//! | `q` | quit (Ctrl-C works too)        |

#![deny(unused_must_use)]

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use thermostat::adapters::config_file::FileConfigStore;
use thermostat::adapters::console::ConsolePanel;
use thermostat::adapters::serial::SerialTelemetry;
use thermostat::adapters::time::SystemClock;
use thermostat::app::controller::ThermostatController;
use thermostat::app::ports::{Clock, ConfigError, ConfigPort};
use thermostat::app::shared::SharedController;
use thermostat::config::ThermostatConfig;
use thermostat::drivers::button::ButtonBank;
use thermostat::drivers::sim_pin::SimPin;
use thermostat::drivers::task_pin::spawn_unit;
use thermostat::runtime::{Ports, Runtime};
use thermostat::sensors::SimPlant;

const DEFAULT_CONFIG_PATH: &str = "thermostat.json";

/// Simulated room at power-on (°C).
const ROOM_START_C: f32 = 19.0;
const ROOM_AMBIENT_C: f32 = 16.0;

/// Keyboard-driven stand-ins for the three buttons.
struct Keypad {
    mode: SimPin,
    raise: SimPin,
    lower: SimPin,
    hold: Duration,
    settle: Duration,
}

impl Keypad {
    fn tap(&self, pin: &SimPin) {
        pin.press();
        thread::sleep(self.hold);
        pin.release();
        thread::sleep(self.settle);
    }
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    // Logs go to stderr so telemetry on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Thermostat v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config (file or defaults) ──────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let config = load_config(&FileConfigStore::new(&config_path))
        .with_context(|| format!("loading config from {config_path}"))?;

    // ── 3. Telemetry link ─────────────────────────────────────
    let link = open_telemetry(&config.telemetry_device)
        .with_context(|| format!("opening telemetry device {}", config.telemetry_device))?;
    let telemetry = SerialTelemetry::new(link);

    // ── 4. Simulation ports ───────────────────────────────────
    let plant = SimPlant::new(ROOM_START_C, ROOM_AMBIENT_C);
    let keypad = Keypad {
        mode: SimPin::new(),
        raise: SimPin::new(),
        lower: SimPin::new(),
        hold: Duration::from_millis(u64::from(config.button_poll_interval_ms) * 3),
        settle: Duration::from_millis(
            u64::from(config.debounce_ms) + u64::from(config.button_poll_interval_ms) * 2,
        ),
    };
    let buttons = ButtonBank::new(
        keypad.mode.clone(),
        keypad.raise.clone(),
        keypad.lower.clone(),
        u64::from(config.debounce_ms),
    );
    let panel = ConsolePanel::new().with_plant(plant.clone());

    // ── 5. Controller + runtime ───────────────────────────────
    let clock = Arc::new(SystemClock::new());
    let controller =
        ThermostatController::new(&config, clock.now()).context("building controller")?;
    let shared = Arc::new(SharedController::new(controller));
    let runtime = Runtime::start(
        &config,
        Arc::clone(&shared),
        Ports {
            sensor: plant.sensor(),
            buttons,
            output: panel,
            telemetry,
        },
        Arc::clone(&clock),
    )
    .context("starting runtime")?;

    // ── 6. Stop sources ───────────────────────────────────────
    let (quit_tx, quit_rx) = mpsc::channel::<&'static str>();
    let ctrlc_tx = quit_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send("Ctrl-C");
    })
    .context("installing Ctrl-C handler")?;

    let faults = config.sensor_failure_threshold;
    spawn_unit("keys", 32, move || read_keys(&keypad, &plant, faults, &quit_tx))
        .context("starting keyboard reader")?;

    let reason = quit_rx.recv().unwrap_or("stop channel closed");
    info!("Stopping: {}", reason);

    runtime.shutdown();
    let last = shared.snapshot();
    info!(
        "Final state: mode={} set_point={} uptime={}s",
        last.mode,
        last.set_point,
        clock.uptime_secs()
    );
    Ok(())
}

/// Missing file means defaults; anything else is an operator error.
fn load_config(store: &impl ConfigPort) -> Result<ThermostatConfig> {
    match store.load() {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::NotFound) => {
            warn!("No config file, using defaults");
            Ok(ThermostatConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn open_telemetry(device: &str) -> Result<Box<dyn Write + Send>> {
    if device == "-" {
        return Ok(Box::new(io::stdout()));
    }
    let file = OpenOptions::new().write(true).open(device)?;
    Ok(Box::new(file))
}

fn read_keys(keypad: &Keypad, plant: &SimPlant, faults: u32, quit: &Sender<&'static str>) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        for key in line.chars() {
            match key {
                'm' => keypad.tap(&keypad.mode),
                '+' => keypad.tap(&keypad.raise),
                '-' => keypad.tap(&keypad.lower),
                'f' => {
                    info!("Injecting {} sensor faults", faults);
                    plant.fail_next(faults);
                }
                'q' => {
                    let _ = quit.send("quit key");
                    return;
                }
                c if c.is_whitespace() => {}
                other => warn!("Unknown key '{}'", other),
            }
        }
    }
    info!("stdin closed; Ctrl-C to stop");
}
