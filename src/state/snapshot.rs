//! Observable state published by the application store

use dungeon_input::KeyStates;
use dungeon_math::Vec3;

use crate::content::{DungeonMap, MaterialDescriptor, ObjectDescriptor, Tile};

/// World lifecycle; there is no torn-down phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    WorldPending,
    WorldReady,
}

/// Kind of content request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    Dungeon,
    Materials,
    Objects,
}

/// Requests currently in flight, per kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fetching {
    pub dungeon: usize,
    pub materials: usize,
    pub objects: usize,
}

impl Fetching {
    fn counter(&mut self, kind: FetchKind) -> &mut usize {
        match kind {
            FetchKind::Dungeon => &mut self.dungeon,
            FetchKind::Materials => &mut self.materials,
            FetchKind::Objects => &mut self.objects,
        }
    }

    pub(crate) fn start(&mut self, kind: FetchKind) {
        *self.counter(kind) += 1;
    }

    pub(crate) fn finish(&mut self, kind: FetchKind) {
        let in_flight = self.counter(kind);
        *in_flight = in_flight.saturating_sub(1);
    }

    pub fn any(&self) -> bool {
        self.dungeon + self.materials + self.objects > 0
    }
}

/// Everything observers can see, published as a whole after each transition
#[derive(Clone, Debug, PartialEq)]
pub struct AppSnapshot {
    pub phase: Phase,
    pub dungeon_map: Option<DungeonMap>,
    /// `dungeon_map.tiles` flattened; replaced together with the map
    pub tiles: Vec<Tile>,
    pub materials: Vec<MaterialDescriptor>,
    pub objects3d: Vec<ObjectDescriptor>,
    pub key_state: KeyStates,
    pub fetching: Fetching,
    pub last_error: Option<String>,
    pub camera_position: Vec3,
}

impl AppSnapshot {
    pub fn new(camera_position: Vec3) -> Self {
        Self {
            phase: Phase::Uninitialized,
            dungeon_map: None,
            tiles: Vec::new(),
            materials: Vec::new(),
            objects3d: Vec::new(),
            key_state: KeyStates::new(),
            fetching: Fetching::default(),
            last_error: None,
            camera_position,
        }
    }

    pub fn seed(&self) -> Option<&str> {
        self.dungeon_map.as_ref().map(|map| map.seed.as_str())
    }
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self::new(Vec3::new(50.0, 50.0, 20.0))
    }
}
