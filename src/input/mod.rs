//! Input handling module
//!
//! Provides input mapping from raw key events to application actions.

mod input_mapper;

pub use input_mapper::{InputMapper, InputAction};
