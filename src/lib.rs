//! Thermostat controller library.
//!
//! Exposes the pure-logic core for integration testing alongside the
//! drivers, adapters and threaded runtime the binary wires together.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod runtime;
pub mod safety;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;
