//! Compass marker at the world origin
//!
//! A static projected entity whose heading shows the seed of the current
//! dungeon. The markup is rewritten whenever a published snapshot carries a
//! different seed.

use dungeon_core::{Entity, EntityKey, Vec3, World, WorldError};
use tokio::sync::watch;

use crate::state::AppSnapshot;

/// Markup for the compass with `seed` as its heading
pub fn compass_markup(seed: Option<&str>) -> String {
    let heading = seed.map(escape).unwrap_or_default();
    format!(
        "<div class=\"compass\"><div class=\"n\">N</div><div class=\"e\">E</div>\
         <div class=\"w\">W</div><div class=\"s\">S</div><h1>{}</h1></div>",
        heading
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub struct CompassSystem {
    key: EntityKey,
    seed: Option<String>,
    updates: watch::Receiver<AppSnapshot>,
}

impl CompassSystem {
    /// Spawn the compass into `world`, following the snapshots on `updates`
    pub fn spawn(world: &mut World, mut updates: watch::Receiver<AppSnapshot>) -> Result<Self, WorldError> {
        let seed = updates.borrow_and_update().seed().map(str::to_owned);
        let entity = Entity::projected(compass_markup(seed.as_deref()), 0.0, Vec3::ZERO)
            .with_name("compass")
            .with_tag("compass");
        let key = world.spawn(entity)?;
        Ok(Self { key, seed, updates })
    }

    pub fn key(&self) -> EntityKey {
        self.key
    }

    /// Rewrite the markup if the dungeon seed changed since the last call
    ///
    /// Returns whether the markup was rewritten. A closed channel counts as
    /// no change.
    pub fn update(&mut self, world: &mut World) -> Result<bool, WorldError> {
        if !self.updates.has_changed().unwrap_or(false) {
            return Ok(false);
        }
        let seed = self.updates.borrow_and_update().seed().map(str::to_owned);
        if seed == self.seed {
            return Ok(false);
        }

        let entity = world
            .entity_mut(self.key)
            .ok_or(WorldError::UnknownEntity(self.key))?;
        entity.set_markup(compass_markup(seed.as_deref()));
        log::debug!("Compass now shows seed {:?}", seed);
        self.seed = seed;
        Ok(true)
    }
}
