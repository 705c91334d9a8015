//! Host-side stand-in for the room and its temperature sensor.
//!
//! [`SimPlant`] is a first-order thermal model: the room relaxes toward
//! ambient and the furnace or air conditioner pushes it while running.
//! The output adapter drives it from the indicator state; [`SimSensor`]
//! reads it back.  Faults are injected with [`SimPlant::fail_next`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use log::debug;

use crate::app::ports::SensorPort;
use crate::app::state::Temperature;
use crate::error::SensorError;

/// Time constant of the room relaxing toward ambient (seconds).
const ROOM_TAU_SECS: f32 = 600.0;
/// Temperature change while the furnace runs (°C per second).
const HEAT_RATE: f32 = 0.05;
/// Temperature change while the air conditioner runs (°C per second).
const COOL_RATE: f32 = 0.04;

#[derive(Debug, Clone, Copy)]
struct Room {
    celsius: f32,
    ambient: f32,
    heating: bool,
    cooling: bool,
}

impl Room {
    fn step(&mut self, dt_secs: f32) {
        let mut rate = (self.ambient - self.celsius) / ROOM_TAU_SECS;
        if self.heating {
            rate += HEAT_RATE;
        }
        if self.cooling {
            rate -= COOL_RATE;
        }
        self.celsius += rate * dt_secs;
    }
}

/// Shared handle to the simulated room.  Clones see the same room.
#[derive(Clone)]
pub struct SimPlant {
    room: Arc<Mutex<Room>>,
    pending_faults: Arc<AtomicU32>,
}

impl SimPlant {
    pub fn new(start_celsius: f32, ambient_celsius: f32) -> Self {
        Self {
            room: Arc::new(Mutex::new(Room {
                celsius: start_celsius,
                ambient: ambient_celsius,
                heating: false,
                cooling: false,
            })),
            pending_faults: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Switch the furnace and air conditioner.
    pub fn drive(&self, heating: bool, cooling: bool) {
        let mut room = self.room();
        room.heating = heating;
        room.cooling = cooling;
    }

    /// Advance the model by `dt_secs`.
    pub fn step(&self, dt_secs: f32) {
        self.room().step(dt_secs);
    }

    pub fn celsius(&self) -> f32 {
        self.room().celsius
    }

    /// Make the next `reads` sensor reads fail with a bus timeout.
    pub fn fail_next(&self, reads: u32) {
        self.pending_faults.fetch_add(reads, Ordering::AcqRel);
    }

    /// A sensor attached to this room.
    pub fn sensor(&self) -> SimSensor {
        SimSensor {
            plant: self.clone(),
            last_read: None,
        }
    }

    fn take_fault(&self) -> bool {
        self.pending_faults
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    fn room(&self) -> std::sync::MutexGuard<'_, Room> {
        self.room.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads the simulated room, advancing it by the wall time since the
/// previous read.
pub struct SimSensor {
    plant: SimPlant,
    last_read: Option<Instant>,
}

impl SensorPort for SimSensor {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        let now = Instant::now();
        if let Some(last) = self.last_read.replace(now) {
            self.plant.step(now.duration_since(last).as_secs_f32());
        }
        if self.plant.take_fault() {
            debug!("SimSensor: injected fault");
            return Err(SensorError::Timeout);
        }
        Ok(Temperature::celsius(self.plant.celsius()))
    }
}
