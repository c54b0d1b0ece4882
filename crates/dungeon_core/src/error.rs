//! Errors raised by the world and entity lifecycle

use dungeon_physics::{BodyKey, PhysicsError};
use thiserror::Error;

use crate::world::EntityKey;

/// Misuse and engine failures surfaced by [`World`](crate::World)
///
/// Everything here is fatal for the call that produced it. The last three
/// variants also poison the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Key never belonged to this world
    #[error("entity {0:?} is not registered with this world")]
    UnknownEntity(EntityKey),

    /// Entity was already disposed
    #[error("entity {0:?} was already disposed")]
    DoubleDispose(EntityKey),

    /// Body is already owned by a world
    #[error("body {0:?} is already registered")]
    AlreadyRegistered(BodyKey),

    /// Entity points at a body the physics engine no longer has
    #[error("body {body:?} of entity {entity:?} is missing from the physics engine")]
    BodyMissing { entity: EntityKey, body: BodyKey },

    /// A previous step failed; the world has to be rebuilt
    #[error("world is poisoned by an earlier failure and must be rebuilt")]
    Poisoned,

    #[error("physics step failed: {0}")]
    Physics(#[from] PhysicsError),

    /// A collision handler returned an error
    #[error("collision handler for entity {entity:?} failed: {source}")]
    Handler {
        entity: EntityKey,
        #[source]
        source: anyhow::Error,
    },
}
