//! Level generation and asset fetching

mod model;
mod service;

pub use model::{DungeonMap, DungeonRequest, MaterialDescriptor, ObjectDescriptor, Tile};
pub use service::{ContentError, ContentService, HttpContentService};
