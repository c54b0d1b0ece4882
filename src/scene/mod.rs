//! Scene construction utilities
//!
//! Spawns RON scene templates into a world with handlers and materials bound.

mod scene_builder;

pub use scene_builder::{SceneBuildError, SceneBuilder};
