//! Keyboard input for Dungeon3D
//!
//! The window layer pushes key events into a [`KeyboardHub`]; anything that
//! wants keys (the application store, debug tools) registers a listener and
//! removes it again when done. [`KeyStates`] is the key code -> pressed map
//! those listeners usually maintain.

mod hub;
mod key_state;

pub use hub::{KeyEvent, KeyPhase, KeyboardHub, ListenerId};
pub use key_state::KeyStates;

pub use winit::keyboard::KeyCode;
