//! Host-side key event dispatcher
//!
//! Mirrors how a browser window hands out key-down and key-up signals:
//! listeners subscribe to one phase and get every matching event until they
//! are removed.

use std::sync::{Arc, Mutex, PoisonError};

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Which edge of a key press a listener wants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A single key transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub phase: KeyPhase,
}

impl KeyEvent {
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            phase: KeyPhase::Down,
        }
    }

    pub fn up(code: KeyCode) -> Self {
        Self {
            code,
            phase: KeyPhase::Up,
        }
    }

    /// Translate a winit key transition
    pub fn from_winit(code: KeyCode, state: ElementState) -> Self {
        match state {
            ElementState::Pressed => Self::down(code),
            ElementState::Released => Self::up(code),
        }
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.phase == KeyPhase::Down
    }
}

/// Handle returned by [`KeyboardHub::add_listener`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    phase: KeyPhase,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Key event dispatcher shared between the window and its consumers
///
/// Cloning is cheap and every clone dispatches to the same listeners.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        // A panicking listener never holds the lock, so the data is intact
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_listener<F>(&self, phase: KeyPhase, callback: F) -> ListenerId
    where
        F: Fn(&KeyEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            phase,
            callback: Arc::new(callback),
        });
        log::trace!("Added {:?} listener {:?}", phase, id);
        id
    }

    /// Remove a listener; false if it was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut registry = self.registry();
        let before = registry.listeners.len();
        registry.listeners.retain(|l| l.id != id);
        before != registry.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry().listeners.len()
    }

    /// Deliver an event to every listener of its phase
    ///
    /// Listeners run outside the registry lock, so they may add or remove
    /// listeners themselves. Returns how many listeners were called.
    pub fn dispatch(&self, event: KeyEvent) -> usize {
        let callbacks: Vec<Callback> = self
            .registry()
            .listeners
            .iter()
            .filter(|l| l.phase == event.phase)
            .map(|l| Arc::clone(&l.callback))
            .collect();

        for callback in &callbacks {
            callback(&event);
        }
        callbacks.len()
    }
}
