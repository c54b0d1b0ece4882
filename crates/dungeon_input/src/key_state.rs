//! Key code -> pressed map

use std::collections::HashMap;

use winit::keyboard::KeyCode;

use crate::hub::KeyEvent;

/// Last known state of every key seen so far
///
/// Keys that were never touched are absent, which reads as "not pressed".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyStates {
    keys: HashMap<KeyCode, bool>,
}

impl KeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition; returns true if the stored state changed
    pub fn apply(&mut self, event: &KeyEvent) -> bool {
        let pressed = event.is_pressed();
        self.keys.insert(event.code, pressed) != Some(pressed)
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.keys.get(&code).copied().unwrap_or(false)
    }

    /// Raw state; `None` for keys never seen
    pub fn get(&self, code: KeyCode) -> Option<bool> {
        self.keys.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().filter(|(_, down)| **down).map(|(code, _)| *code)
    }
}
