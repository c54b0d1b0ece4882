//! Audio bridge
//!
//! The audio engine is an external collaborator reached through the
//! call/result style [`AudioSystem`] trait. Every non-OK result is fatal for
//! the operation that made the call.

mod impact;
mod null;
mod sound_bank;
mod system;

pub use impact::ImpactSound;
pub use null::NullAudio;
pub use sound_bank::SoundBank;
pub use system::{check, AudioCode, AudioError, AudioSystem, EventDescription, EventInstance};
