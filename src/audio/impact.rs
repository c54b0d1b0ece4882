//! Impact sounds triggered from collision callbacks

use std::sync::Arc;

use dungeon_core::{CollisionEvent, CollisionHandler};

use super::sound_bank::SoundBank;

/// Plays the impact one-shot scaled by how hard two bodies met
///
/// Contacts whose rounded closing speed is zero stay silent, so resting
/// bodies do not retrigger the sound every step.
#[derive(Debug, Clone)]
pub struct ImpactSound {
    bank: Arc<SoundBank>,
    volume_scale: f32,
    pitch: f32,
}

impl ImpactSound {
    pub fn new(bank: Arc<SoundBank>, volume_scale: f32, pitch: f32) -> Self {
        Self {
            bank,
            volume_scale,
            pitch,
        }
    }

    /// Low thud for falling cubes
    pub fn cube(bank: Arc<SoundBank>) -> Self {
        Self::new(bank, 0.1, 3.0)
    }

    /// Quiet high click for letters
    pub fn letter(bank: Arc<SoundBank>) -> Self {
        Self::new(bank, 0.01, 5.0)
    }

    /// Volume for an impact, or `None` when it is too soft to hear
    pub fn volume_for(&self, impact_velocity: f32) -> Option<f32> {
        let strength = impact_velocity.round().abs();
        (strength > 0.0).then(|| strength * self.volume_scale)
    }
}

impl CollisionHandler for ImpactSound {
    fn on_collide(&self, event: &CollisionEvent) -> anyhow::Result<()> {
        if let Some(volume) = self.volume_for(event.impact_velocity) {
            self.bank.one_shot(volume, self.pitch)?;
        }
        Ok(())
    }
}
