//! Dungeon3D - physics-driven 3D scene over a generated dungeon
//!
//! The binary wires these together:
//!
//! - [`config`] - Layered TOML/env configuration
//! - [`state`] - Application store owning the world, fetched content and key state
//! - [`content`] - Level generation and asset service client
//! - [`audio`] - Audio engine bridge and impact sounds
//! - [`scene`] - Spawns RON scene templates into the world
//! - [`input`] - Maps keys to application actions
//! - [`systems`] - Window and fixed-step simulation

pub mod audio;
pub mod config;
pub mod content;
pub mod input;
pub mod scene;
pub mod state;
pub mod systems;
