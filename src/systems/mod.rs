//! Application systems
//!
//! Frame-loop pieces kept out of main.rs so they can be tested on their own.

mod compass;
mod frame_clock;
mod simulation;
mod window;

pub use compass::{compass_markup, CompassSystem};
pub use frame_clock::FrameClock;
pub use simulation::{SimulationResult, SimulationSystem};
pub use window::{WindowError, WindowSystem};
