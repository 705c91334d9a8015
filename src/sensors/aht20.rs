//! AHT20 digital temperature/humidity sensor over I2C.
//!
//! ## Protocol
//!
//! | Step      | Bytes                 | Notes                              |
//! |-----------|-----------------------|------------------------------------|
//! | status    | read 1                | bit 7 busy, bit 3 calibrated       |
//! | calibrate | `BE 08 00`            | only if the calibrated bit is clear|
//! | trigger   | `AC 33 00`            | conversion takes ~80 ms            |
//! | result    | read 7                | status, 5 data bytes, CRC-8        |
//!
//! Temperature is the low 20 bits of data bytes 3..6:
//! `T = raw / 2^20 * 200 - 50` (°C).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info};

use crate::app::ports::SensorPort;
use crate::app::state::Temperature;
use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x38;

const CMD_CALIBRATE: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const POWER_ON_DELAY_MS: u32 = 40;
const CALIBRATE_DELAY_MS: u32 = 10;
const CONVERSION_DELAY_MS: u32 = 80;

/// Rated operating range (°C).
const MIN_CELSIUS: f32 = -40.0;
const MAX_CELSIUS: f32 = 85.0;

pub struct Aht20<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Aht20<I2C, D> {
    /// Probe the device and load its calibration if needed.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, SensorError> {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, mut delay: D, address: u8) -> Result<Self, SensorError> {
        delay.delay_ms(POWER_ON_DELAY_MS);
        let mut sensor = Self {
            i2c,
            delay,
            address,
        };

        let status = sensor.status()?;
        if status & STATUS_CALIBRATED == 0 {
            info!("AHT20: loading calibration");
            sensor.write(&CMD_CALIBRATE)?;
            sensor.delay.delay_ms(CALIBRATE_DELAY_MS);
            if sensor.status()? & STATUS_CALIBRATED == 0 {
                return Err(SensorError::BusFault);
            }
        }
        info!("AHT20 ready at 0x{:02X}", address);
        Ok(sensor)
    }

    /// Hand the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn status(&mut self) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| bus_fault(e.kind()))?;
        Ok(buf[0])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| bus_fault(e.kind()))
    }

    fn measure(&mut self) -> Result<f32, SensorError> {
        self.write(&CMD_TRIGGER)?;
        self.delay.delay_ms(CONVERSION_DELAY_MS);

        let mut frame = [0u8; 7];
        self.i2c
            .read(self.address, &mut frame)
            .map_err(|e| bus_fault(e.kind()))?;

        if frame[0] & STATUS_BUSY != 0 {
            debug!("AHT20: conversion still busy");
            return Err(SensorError::BusFault);
        }
        if crc8(&frame[..6]) != frame[6] {
            debug!("AHT20: CRC mismatch");
            return Err(SensorError::BusFault);
        }

        let raw = (u32::from(frame[3] & 0x0F) << 16) | (u32::from(frame[4]) << 8) | u32::from(frame[5]);
        Ok(raw_to_celsius(raw))
    }
}

impl<I2C: I2c, D: DelayNs> SensorPort for Aht20<I2C, D> {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        let celsius = self.measure()?;
        if !(MIN_CELSIUS..=MAX_CELSIUS).contains(&celsius) {
            return Err(SensorError::OutOfRange);
        }
        Ok(Temperature::celsius(celsius))
    }
}

fn bus_fault(kind: embedded_hal::i2c::ErrorKind) -> SensorError {
    debug!("AHT20 bus error: {:?}", kind);
    SensorError::BusFault
}

fn raw_to_celsius(raw: u32) -> f32 {
    raw as f32 / (1u32 << 20) as f32 * 200.0 - 50.0
}

/// CRC-8, polynomial 0x31, init 0xFF.
fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &b in bytes {
        crc ^= b;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}
