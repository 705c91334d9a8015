//! Named execution units.
//!
//! Every cadence in the runtime is its own OS thread.  Units are spawned
//! with a name (visible in debuggers and `top -H`) and an explicit stack
//! so a runaway unit shows up as a stack overflow rather than silent heap
//! growth.

use std::thread::{Builder, JoinHandle};

use crate::error::{Error, Result};

/// Default stack for an execution unit.
pub const UNIT_STACK_KB: usize = 64;

/// Spawn `f` as the unit `name` with a `stack_kb` stack.
pub fn spawn_unit(
    name: &'static str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    log::info!("Spawning '{}' (stack={}KB)", name, stack_kb);

    Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|_| Error::Init(name))
}
