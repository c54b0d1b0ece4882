//! Game simulation system
//!
//! Turns frame time into fixed world steps:
//! - Delta time calculation
//! - Fixed-step accumulation
//! - World stepping (physics, collision dispatch, render sync)

use std::time::{Duration, Instant};

use dungeon_core::{World, WorldError};

use super::frame_clock::FrameClock;
use crate::config::PhysicsConfig;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Fixed steps run this frame
    pub steps: u32,
}

/// Drives [`World::step`] at a fixed cadence
pub struct SimulationSystem {
    clock: FrameClock,
    last_frame: Instant,
}

impl SimulationSystem {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            clock: FrameClock::new(config.timestep, config.max_steps_per_frame),
            last_frame: Instant::now(),
        }
    }

    /// Run one frame using wall-clock time since the previous frame
    pub fn update(&mut self, world: &mut World) -> Result<SimulationResult, WorldError> {
        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;
        self.tick(world, elapsed)
    }

    /// Run one frame covering `elapsed`
    ///
    /// Stops at the first failing step; the world is poisoned by then.
    pub fn tick(&mut self, world: &mut World, elapsed: Duration) -> Result<SimulationResult, WorldError> {
        let steps = self.clock.advance(elapsed);
        let dt = self.clock.timestep();
        for _ in 0..steps {
            world.step(dt)?;
        }
        Ok(SimulationResult { steps })
    }
}
