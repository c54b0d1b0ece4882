//! Input mapping from raw key events to application actions
//!
//! Only a few keys mean something to the application itself. Every key event
//! also goes to the [`KeyboardHub`](dungeon_input::KeyboardHub), mapped or not.

use dungeon_input::{KeyEvent, KeyPhase};
use winit::keyboard::KeyCode;

/// Actions triggered by special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Exit application (Escape)
    Exit,
    /// Request a new dungeon with a fresh seed (R key)
    RegenerateDungeon,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Start or stop the background music (M key)
    ToggleMusic,
}

/// Maps key events to actions
pub struct InputMapper;

impl InputMapper {
    /// Returns `Some(action)` for special keys on key-down, `None` otherwise
    pub fn map_keyboard(event: &KeyEvent) -> Option<InputAction> {
        if event.phase != KeyPhase::Down {
            return None;
        }

        match event.code {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyR => Some(InputAction::RegenerateDungeon),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::KeyM => Some(InputAction::ToggleMusic),
            _ => None,
        }
    }
}
