//! Debounced push-button bank.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups: a pin reading low means
//! the button is held.  Each pin is sampled at the button unit's poll
//! rate and run through a lock-out [`Debouncer`].
//!
//! ## Debounce
//!
//! The first level change is accepted immediately and then nothing on
//! that button is accepted for `lockout_ms`.  Contact bounce inside the
//! window is ignored; a level that is still different once the window
//! closes is reported on the next poll.
//!
//! ```text
//! raw     ‾‾‾|_|‾|_________________|‾|_|‾‾‾‾‾‾‾‾
//! edges      P                     R
//!            |<- lockout ->|       |<- lockout ->|
//! ```

use std::time::Instant;

use embedded_hal::digital::InputPin;
use log::debug;

use crate::app::ports::{ButtonPort, Edges};
use crate::fsm::{ButtonEvent, ButtonId, Edge};

/// Lock-out debouncer for one button.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    lockout_ms: u64,
    pressed: bool,
    last_edge_ms: Option<u64>,
}

impl Debouncer {
    pub const fn new(lockout_ms: u64) -> Self {
        Self {
            lockout_ms,
            pressed: false,
            last_edge_ms: None,
        }
    }

    /// Feed one raw sample taken at `now_ms`; returns an accepted edge.
    pub fn sample(&mut self, raw_pressed: bool, now_ms: u64) -> Option<Edge> {
        if raw_pressed == self.pressed {
            return None;
        }
        if let Some(last) = self.last_edge_ms {
            if now_ms.saturating_sub(last) < self.lockout_ms {
                return None;
            }
        }
        self.pressed = raw_pressed;
        self.last_edge_ms = Some(now_ms);
        Some(if raw_pressed {
            Edge::Pressed
        } else {
            Edge::Released
        })
    }
}

struct Button<P> {
    id: ButtonId,
    pin: P,
    debouncer: Debouncer,
}

/// Mode, Raise and Lower buttons behind one [`ButtonPort`].
pub struct ButtonBank<P> {
    buttons: [Button<P>; 3],
    started: Instant,
}

impl<P: InputPin> ButtonBank<P> {
    pub fn new(mode: P, raise: P, lower: P, lockout_ms: u64) -> Self {
        let button = |id, pin| Button {
            id,
            pin,
            debouncer: Debouncer::new(lockout_ms),
        };
        Self {
            buttons: [
                button(ButtonId::Mode, mode),
                button(ButtonId::Raise, raise),
                button(ButtonId::Lower, lower),
            ],
            started: Instant::now(),
        }
    }

    /// Poll every pin as of `now_ms`.
    pub fn poll_at(&mut self, now_ms: u64) -> Edges {
        let mut edges = Edges::new();
        for button in self.buttons.iter_mut() {
            let raw_pressed = match button.pin.is_low() {
                Ok(low) => low,
                Err(_) => {
                    debug!("{:?} pin read failed", button.id);
                    continue;
                }
            };
            if let Some(edge) = button.debouncer.sample(raw_pressed, now_ms) {
                // Capacity covers one edge per button per poll.
                let _ = edges.push(ButtonEvent { id: button.id, edge });
            }
        }
        edges
    }
}

impl<P: InputPin> ButtonPort for ButtonBank<P> {
    fn poll_edges(&mut self) -> Edges {
        let now_ms = self.started.elapsed().as_millis() as u64;
        self.poll_at(now_ms)
    }
}
