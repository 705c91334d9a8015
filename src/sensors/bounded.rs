//! Read-timeout enforcement for blocking sensors.
//!
//! The wrapped sensor lives on a dedicated `sensor-bus` thread.  Each
//! [`read_temperature`](SensorPort::read_temperature) posts a request and
//! waits at most `timeout` for the answer.  A read that overruns is left
//! to finish in the background; while it is outstanding no new request is
//! posted, so a wedged bus never accumulates a backlog.
//!
//! ```text
//!   sensor unit                 sensor-bus worker
//!   ───────────                 ─────────────────
//!   request ───────────────────▶ inner.read_temperature()
//!   recv_timeout(timeout) ◀───── result
//!        │
//!        └─ elapsed ─▶ Err(Timeout), in_flight = true
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::SensorPort;
use crate::app::state::Temperature;
use crate::error::{self, Error, SensorError};

type Reading = Result<Temperature, SensorError>;

pub struct BoundedSensor {
    requests: Sender<()>,
    results: Receiver<Reading>,
    timeout: Duration,
    in_flight: bool,
}

impl BoundedSensor {
    /// Move `sensor` onto its own worker thread.
    pub fn spawn<S>(mut sensor: S, timeout: Duration) -> error::Result<Self>
    where
        S: SensorPort + Send + 'static,
    {
        let (requests, request_rx) = mpsc::channel::<()>();
        let (result_tx, results) = mpsc::channel::<Reading>();

        thread::Builder::new()
            .name("sensor-bus".into())
            .spawn(move || {
                // Ends once the owning BoundedSensor is dropped.
                while request_rx.recv().is_ok() {
                    if result_tx.send(sensor.read_temperature()).is_err() {
                        break;
                    }
                }
                debug!("sensor-bus worker exiting");
            })
            .map_err(|_| Error::Init("sensor worker thread"))?;

        info!("Sensor reads bounded to {} ms", timeout.as_millis());
        Ok(Self {
            requests,
            results,
            timeout,
            in_flight: false,
        })
    }

    fn wait(&mut self) -> Reading {
        match self.results.recv_timeout(self.timeout) {
            Ok(reading) => {
                self.in_flight = false;
                reading
            }
            Err(RecvTimeoutError::Timeout) => {
                self.in_flight = true;
                Err(SensorError::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => Err(SensorError::BusFault),
        }
    }
}

impl SensorPort for BoundedSensor {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        if self.in_flight {
            match self.results.try_recv() {
                Ok(late) => {
                    // Too old to act on; start a fresh read.
                    debug!("Discarding late sensor result {:?}", late);
                    self.in_flight = false;
                }
                Err(TryRecvError::Empty) => {
                    debug!("Previous sensor read still outstanding");
                    return Err(SensorError::Timeout);
                }
                Err(TryRecvError::Disconnected) => return Err(SensorError::BusFault),
            }
        }

        if self.requests.send(()).is_err() {
            warn!("sensor-bus worker is gone");
            return Err(SensorError::BusFault);
        }
        self.wait()
    }
}
