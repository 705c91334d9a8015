//! Input drivers and thread helpers.

pub mod button;
pub mod sim_pin;
pub mod task_pin;
