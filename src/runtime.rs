//! Execution units.
//!
//! ```text
//!  ┌────────────┐   ┌────────────┐        ┌──────────────────────────┐
//!  │ sensor     │   │ buttons    │        │ output                   │
//!  │ every 2 s  │   │ every 20ms │        │ drain changes (FIFO)     │
//!  │ BoundedSen.│   │ poll_edges │        │ DisplayRefresh, PageFlip │
//!  └─────┬──────┘   └─────┬──────┘        │ Telemetry periodic       │
//!        │ sample         │ edges         └────────────▲─────────────┘
//!        ▼                ▼                            │ StateChange
//!  ┌─────────────────────────────────────────────┐     │
//!  │            SharedController                 │─────┘
//!  └─────────────────────────────────────────────┘
//! ```
//!
//! Each unit owns its ports outright; the only shared object is the
//! [`SharedController`].  A unit that stalls on its port delays only
//! itself.  Shutdown sets one flag; every unit notices within one pacing
//! slice and the output unit blanks the panel on its way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};

use crate::app::display::{DisplayPage, DisplayState};
use crate::app::ports::{ButtonPort, Clock, OutputPort, SensorPort, TelemetryPort};
use crate::app::shared::SharedController;
use crate::app::state::ThermostatState;
use crate::app::telemetry::StatusRecord;
use crate::config::ThermostatConfig;
use crate::drivers::task_pin::{spawn_unit, UNIT_STACK_KB};
use crate::error::{Error, Result};
use crate::scheduler::{Job, Scheduler, SchedulerDelegate};
use crate::sensors::BoundedSensor;

/// Longest a unit sleeps before re-checking the stop flag.
const STOP_SLICE: Duration = Duration::from_millis(50);

/// Output unit wake-up period.
const OUTPUT_TICK: Duration = Duration::from_millis(20);

/// The four ports a runtime drives.
pub struct Ports<S, B, O, T> {
    pub sensor: S,
    pub buttons: B,
    pub output: O,
    pub telemetry: T,
}

pub struct Runtime {
    stop: Arc<AtomicBool>,
    units: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Spawn the sensor, button and output units.
    ///
    /// An invalid `config` is rejected before anything is spawned.  If a
    /// unit fails to start, the ones already running are stopped before
    /// the error is returned.
    pub fn start<S, B, O, T, C>(
        config: &ThermostatConfig,
        shared: Arc<SharedController>,
        ports: Ports<S, B, O, T>,
        clock: Arc<C>,
    ) -> Result<Self>
    where
        S: SensorPort + Send + 'static,
        B: ButtonPort + Send + 'static,
        O: OutputPort + Send + 'static,
        T: TelemetryPort + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        config.validate().map_err(Error::Config)?;

        let mut runtime = Self {
            stop: Arc::new(AtomicBool::new(false)),
            units: Vec::with_capacity(3),
        };

        let sensor = BoundedSensor::spawn(
            ports.sensor,
            Duration::from_millis(u64::from(config.sensor_timeout_ms)),
        )?;

        let output = OutputUnit {
            shared: Arc::clone(&shared),
            clock: Arc::clone(&clock),
            output: ports.output,
            telemetry: ports.telemetry,
            page: DisplayPage::default(),
        };
        let refresh_ms = u64::from(config.display_refresh_interval_ms);
        let mut scheduler = Scheduler::new();
        scheduler.add(Job::DisplayRefresh, refresh_ms);
        scheduler.add(
            Job::PageFlip,
            refresh_ms * u64::from(config.display_page_refreshes.max(1)),
        );
        scheduler.add(
            Job::Telemetry,
            u64::from(config.telemetry_interval_secs) * 1000,
        );
        debug!("Output unit: {} scheduled jobs", scheduler.len());
        let stop = Arc::clone(&runtime.stop);
        runtime.spawn("output", move || output.run(scheduler, &stop))?;

        let sensor_period = Duration::from_millis(u64::from(config.sensor_poll_interval_ms));
        let stop = Arc::clone(&runtime.stop);
        let (s, c) = (Arc::clone(&shared), Arc::clone(&clock));
        runtime.spawn("sensor", move || sensor_unit(sensor, &s, &*c, sensor_period, &stop))?;

        let button_period = Duration::from_millis(u64::from(config.button_poll_interval_ms));
        let stop = Arc::clone(&runtime.stop);
        let buttons = ports.buttons;
        runtime.spawn("buttons", move || {
            button_unit(buttons, &shared, &*clock, button_period, &stop)
        })?;

        info!("Runtime started ({} units)", runtime.units.len());
        Ok(runtime)
    }

    /// Stop every unit and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
        info!("Runtime stopped");
    }

    fn spawn(&mut self, name: &'static str, f: impl FnOnce() + Send + 'static) -> Result<()> {
        match spawn_unit(name, UNIT_STACK_KB, f) {
            Ok(handle) => {
                self.units.push(handle);
                Ok(())
            }
            Err(e) => {
                self.stop_and_join();
                Err(e)
            }
        }
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        for handle in self.units.drain(..) {
            let name = handle.thread().name().unwrap_or("?").to_owned();
            if handle.join().is_err() {
                warn!("Unit '{}' panicked", name);
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.units.is_empty() {
            self.stop_and_join();
        }
    }
}

/// Sleep out the rest of `period` measured from `started`, waking at least
/// every [`STOP_SLICE`].  Returns `false` once `stop` is set.
fn pace(started: Instant, period: Duration, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let elapsed = started.elapsed();
        if elapsed >= period {
            return true;
        }
        thread::sleep((period - elapsed).min(STOP_SLICE));
    }
}

fn sensor_unit<S: SensorPort, C: Clock + ?Sized>(
    mut sensor: S,
    shared: &SharedController,
    clock: &C,
    period: Duration,
    stop: &AtomicBool,
) {
    loop {
        let started = Instant::now();
        let sample = sensor.read_temperature();
        if let Err(e) = sample {
            debug!("Sensor read failed: {}", e);
        }
        shared.on_temperature_sample(sample, clock.now());
        if !pace(started, period, stop) {
            break;
        }
    }
    debug!("sensor unit exiting");
}

fn button_unit<B: ButtonPort, C: Clock + ?Sized>(
    mut buttons: B,
    shared: &SharedController,
    clock: &C,
    period: Duration,
    stop: &AtomicBool,
) {
    loop {
        let started = Instant::now();
        for event in buttons.poll_edges() {
            debug!("Button {:?} {:?}", event.id, event.edge);
            shared.on_button_event(event, clock.now());
        }
        if !pace(started, period, stop) {
            break;
        }
    }
    debug!("button unit exiting");
}

/// Jobs that came due during one scheduler tick.
#[derive(Default)]
struct Due {
    refresh: bool,
    flip: bool,
    telemetry: bool,
}

impl SchedulerDelegate for Due {
    fn on_job_due(&mut self, job: Job) {
        match job {
            Job::DisplayRefresh => self.refresh = true,
            Job::PageFlip => self.flip = true,
            Job::Telemetry => self.telemetry = true,
        }
    }
}

struct OutputUnit<O, T, C> {
    shared: Arc<SharedController>,
    clock: Arc<C>,
    output: O,
    telemetry: T,
    page: DisplayPage,
}

impl<O: OutputPort, T: TelemetryPort, C: Clock> OutputUnit<O, T, C> {
    fn run(mut self, mut scheduler: Scheduler, stop: &AtomicBool) {
        let initial = self.shared.snapshot();
        self.present(&initial);
        self.report(&initial, self.clock.now());

        let mut last = Instant::now();
        loop {
            let tick_started = Instant::now();
            let mut dirty = self.drain_changes();

            let mut due = Due::default();
            let now = Instant::now();
            scheduler.tick(now.duration_since(last).as_millis() as u64, &mut due);
            last = now;

            if due.flip {
                self.page = self.page.flipped();
            }
            if due.refresh || due.flip {
                dirty = Some(dirty.unwrap_or_else(|| self.shared.snapshot()));
            }
            if due.telemetry {
                let state = self.shared.snapshot();
                self.report(&state, self.clock.now());
            }
            if let Some(state) = dirty {
                self.present(&state);
            }

            if !pace(tick_started, OUTPUT_TICK, stop) {
                break;
            }
        }

        self.output.blank();
        debug!("output unit exiting");
    }

    /// Report queued changes in order; returns the newest state seen.
    ///
    /// After an overflow the queue lacks the latest changes, so the current
    /// state is reported in their place.
    fn drain_changes(&mut self) -> Option<ThermostatState> {
        let mut latest = None;
        while let Some(change) = self.shared.next_change() {
            debug!("Change: {:?}", change.cause);
            self.report(&change.state, change.state.last_updated);
            latest = Some(change.state);
        }
        if let Some(state) = self.shared.recover_overflow() {
            warn!("Change queue overflowed; reporting current state");
            self.report(&state, state.last_updated);
            latest = Some(state);
        }
        latest
    }

    fn present(&mut self, state: &ThermostatState) {
        self.output
            .set_indicator(state.mode, state.activation.any());
        let local = self.clock.now().with_timezone(&Local);
        self.output
            .render_display(&DisplayState::project(state, &local, self.page));
    }

    fn report(&mut self, state: &ThermostatState, at: DateTime<Utc>) {
        let record = StatusRecord::from_state(state, at);
        if let Err(e) = self.telemetry.emit(&record) {
            warn!("Telemetry dropped: {}", e);
        }
    }
}
