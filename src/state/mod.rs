//! Application store and its published state

mod app_state;
mod snapshot;

pub use app_state::{ApplicationState, SharedWorld, StateError};
pub use snapshot::{AppSnapshot, FetchKind, Fetching, Phase};
