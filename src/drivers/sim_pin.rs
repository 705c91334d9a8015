//! Simulated input pin for hosts without GPIO.
//!
//! Models an active-low button with a pull-up: idle reads high,
//! [`SimPin::press`] pulls it low.  Clones share the same line, so the
//! keyboard thread holds one end and the [`ButtonBank`] the other.
//!
//! [`ButtonBank`]: super::button::ButtonBank

use core::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, InputPin};

#[derive(Debug, Clone)]
pub struct SimPin {
    high: Arc<AtomicBool>,
}

impl Default for SimPin {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPin {
    pub fn new() -> Self {
        Self {
            high: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn press(&self) {
        self.high.store(false, Ordering::Release);
    }

    pub fn release(&self) {
        self.high.store(true, Ordering::Release);
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high.load(Ordering::Acquire))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high.load(Ordering::Acquire))
    }
}
