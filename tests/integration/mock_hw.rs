//! Mock ports for integration tests.
//!
//! Every mock hands out a cloneable handle so the test thread can script
//! inputs and inspect recorded outputs while the runtime owns the port.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thermostat::app::display::DisplayState;
use thermostat::app::ports::{
    ButtonPort, Clock, Edges, OutputPort, SensorPort, TelemetryPort, MAX_EDGES_PER_POLL,
};
use thermostat::app::state::Temperature;
use thermostat::app::telemetry::StatusRecord;
use thermostat::error::{SensorError, TelemetryError};
use thermostat::fsm::{ButtonEvent, Mode};

// ── Sensor ────────────────────────────────────────────────────

/// Returns whatever the test last set, optionally after a delay.
#[derive(Clone)]
pub struct ScriptedSensor {
    reading: Arc<Mutex<Result<Temperature, SensorError>>>,
    latency_ms: Arc<AtomicU32>,
    reads: Arc<AtomicU32>,
}

impl ScriptedSensor {
    pub fn new(initial: Result<Temperature, SensorError>) -> Self {
        Self {
            reading: Arc::new(Mutex::new(initial)),
            latency_ms: Arc::new(AtomicU32::new(0)),
            reads: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn fahrenheit(degrees: f32) -> Self {
        Self::new(Ok(Temperature::fahrenheit(degrees)))
    }

    pub fn set(&self, reading: Result<Temperature, SensorError>) {
        *self.reading.lock().unwrap() = reading;
    }

    pub fn set_fahrenheit(&self, degrees: f32) {
        self.set(Ok(Temperature::fahrenheit(degrees)));
    }

    /// Make every read block for `ms` before answering.
    pub fn set_latency_ms(&self, ms: u32) {
        self.latency_ms.store(ms, Ordering::Relaxed);
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl SensorPort for ScriptedSensor {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            thread::sleep(Duration::from_millis(u64::from(latency)));
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
        *self.reading.lock().unwrap()
    }
}

// ── Buttons ───────────────────────────────────────────────────

/// Queue of already-debounced edges, drained a poll at a time.
#[derive(Clone, Default)]
pub struct QueuedButtons {
    queue: Arc<Mutex<VecDeque<ButtonEvent>>>,
}

impl QueuedButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ButtonEvent) {
        self.queue.lock().unwrap().push_back(event);
    }

    pub fn is_drained(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}

impl ButtonPort for QueuedButtons {
    fn poll_edges(&mut self) -> Edges {
        let mut queue = self.queue.lock().unwrap();
        let mut edges = Edges::new();
        while edges.len() < MAX_EDGES_PER_POLL {
            match queue.pop_front() {
                Some(e) => {
                    let _ = edges.push(e);
                }
                None => break,
            }
        }
        edges
    }
}

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Indicator { mode: Mode, active: bool },
    Render(DisplayState),
    Blank,
}

#[derive(Clone, Default)]
pub struct RecordingOutput {
    pub calls: Arc<Mutex<Vec<OutputCall>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saw_indicator(&self, mode: Mode, active: bool) -> bool {
        self.calls()
            .iter()
            .any(|c| *c == OutputCall::Indicator { mode, active })
    }

    pub fn rendered_line2(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                OutputCall::Render(d) => Some(d.line2.as_str().to_owned()),
                _ => None,
            })
            .collect()
    }
}

impl OutputPort for RecordingOutput {
    fn set_indicator(&mut self, mode: Mode, active: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(OutputCall::Indicator { mode, active });
    }

    fn render_display(&mut self, display: &DisplayState) {
        self.calls
            .lock()
            .unwrap()
            .push(OutputCall::Render(display.clone()));
    }

    fn blank(&mut self) {
        self.calls.lock().unwrap().push(OutputCall::Blank);
    }
}

// ── Telemetry ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingTelemetry {
    records: Arc<Mutex<Vec<StatusRecord>>>,
    failing: Arc<AtomicBool>,
    attempts: Arc<AtomicU32>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every emit fails with `Disconnected` while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn records(&self) -> Vec<StatusRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Modes in emission order with consecutive repeats collapsed.
    pub fn mode_sequence(&self) -> Vec<Mode> {
        let mut modes: Vec<Mode> = self.records().iter().map(|r| r.mode).collect();
        modes.dedup();
        modes
    }
}

impl TelemetryPort for RecordingTelemetry {
    fn emit(&mut self, record: &StatusRecord) -> Result<(), TelemetryError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Relaxed) {
            return Err(TelemetryError::Disconnected);
        }
        self.records.lock().unwrap().push(*record);
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
