//! Top-level application store
//!
//! Owns the single [`World`], runs content fetches and captures keyboard
//! input. Observers read [`AppSnapshot`]s from a watch channel; every
//! completed operation publishes exactly one new snapshot.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use dungeon_core::{PhysicsConfig, World};
use dungeon_input::{KeyEvent, KeyPhase, KeyboardHub, ListenerId};
use dungeon_math::Vec3;
use thiserror::Error;
use tokio::sync::watch;

use super::snapshot::{AppSnapshot, FetchKind, Phase};
use crate::content::{ContentError, ContentService, DungeonRequest};

/// World shared between the store and the frame loop
pub type SharedWorld = Arc<Mutex<World>>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("the world has already been created")]
    WorldAlreadyCreated,
    #[error("the world has not been created yet")]
    WorldNotReady,
    #[error(transparent)]
    Content(#[from] ContentError),
}

struct KeyboardBinding {
    hub: KeyboardHub,
    down: ListenerId,
    up: ListenerId,
}

struct Inner<C> {
    content: C,
    dungeon_window: [i32; 4],
    world: OnceLock<SharedWorld>,
    tx: watch::Sender<AppSnapshot>,
    keyboard: Mutex<Option<KeyboardBinding>>,
}

/// Cloneable handle to the store
pub struct ApplicationState<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for ApplicationState<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: ContentService> ApplicationState<C> {
    /// Create a store fetching from `content`; dungeons are requested for `dungeon_window` `[x, y, w, h]`
    pub fn new(content: C, dungeon_window: [i32; 4], camera_position: Vec3) -> Self {
        let (tx, _) = watch::channel(AppSnapshot::new(camera_position));
        Self {
            inner: Arc::new(Inner {
                content,
                dungeon_window,
                world: OnceLock::new(),
                tx,
                keyboard: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AppSnapshot {
        self.inner.tx.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.tx.borrow().phase
    }

    /// Build the world; a second call fails and leaves the first world in place
    pub fn create_world(&self, config: PhysicsConfig) -> Result<SharedWorld, StateError> {
        if self.inner.world.get().is_some() {
            log::error!("create_world called twice");
            return Err(StateError::WorldAlreadyCreated);
        }

        // Only the caller whose initializer runs publishes phase changes
        let mut created = None;
        self.inner.world.get_or_init(|| {
            self.inner.tx.send_modify(|state| state.phase = Phase::WorldPending);
            let world = Arc::new(Mutex::new(World::with_config(config)));
            created = Some(Arc::clone(&world));
            world
        });
        let Some(world) = created else {
            log::error!("create_world lost a race with another caller");
            return Err(StateError::WorldAlreadyCreated);
        };
        self.inner.tx.send_modify(|state| state.phase = Phase::WorldReady);

        log::info!("World created");
        Ok(world)
    }

    pub fn world(&self) -> Option<SharedWorld> {
        self.inner.world.get().cloned()
    }

    pub fn require_world(&self) -> Result<SharedWorld, StateError> {
        self.world().ok_or(StateError::WorldNotReady)
    }

    /// Generate a dungeon for `seed` and make it the current one
    ///
    /// Overlapping calls are not cancelled: whichever response arrives last
    /// wins, regardless of call order.
    pub async fn create_dungeon_area(&self, seed: impl Into<String>) -> Result<(), StateError> {
        let request = DungeonRequest::new(seed, self.inner.dungeon_window);
        log::info!("Requesting dungeon for seed {:?}", request.seed);
        self.inner.tx.send_modify(|state| state.fetching.start(FetchKind::Dungeon));

        match self.inner.content.create_dungeon(request).await {
            Ok(map) => {
                let tiles = map.flatten_tiles();
                log::info!("Dungeon {:?} ready with {} tiles", map.seed, tiles.len());
                self.inner.tx.send_modify(move |state| {
                    state.fetching.finish(FetchKind::Dungeon);
                    state.tiles = tiles;
                    state.dungeon_map = Some(map);
                });
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(e, FetchKind::Dungeon)),
        }
    }

    /// Replace the material list
    pub async fn load_materials(&self) -> Result<(), StateError> {
        log::info!("Loading materials");
        self.inner.tx.send_modify(|state| state.fetching.start(FetchKind::Materials));

        match self.inner.content.materials().await {
            Ok(materials) => {
                log::info!("Loaded {} materials", materials.len());
                self.inner.tx.send_modify(move |state| {
                    state.fetching.finish(FetchKind::Materials);
                    state.materials = materials;
                });
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(e, FetchKind::Materials)),
        }
    }

    /// Fetch one object descriptor and append it
    pub async fn load_object(&self, id: u64) -> Result<(), StateError> {
        log::info!("Loading object {}", id);
        self.inner.tx.send_modify(|state| state.fetching.start(FetchKind::Objects));

        match self.inner.content.object(id).await {
            Ok(object) => {
                self.inner.tx.send_modify(move |state| {
                    state.fetching.finish(FetchKind::Objects);
                    state.objects3d.push(object);
                });
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(e, FetchKind::Objects)),
        }
    }

    fn fetch_failed(&self, error: ContentError, kind: FetchKind) -> StateError {
        log::error!("Fetching {:?} failed: {}", kind, error);
        let message = error.to_string();
        self.inner.tx.send_modify(move |state| {
            state.fetching.finish(kind);
            state.last_error = Some(message);
        });
        StateError::Content(error)
    }

    /// Start mirroring key-down/key-up events from `hub` into `key_state`
    ///
    /// Returns false without doing anything if already bound.
    pub fn bind_keyboard_events(&self, hub: &KeyboardHub) -> bool {
        let mut keyboard = self.keyboard();
        if keyboard.is_some() {
            log::warn!("Keyboard events already bound");
            return false;
        }

        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        let on_key = move |event: &KeyEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.tx.send_if_modified(|state| state.key_state.apply(event));
            }
        };
        let down = hub.add_listener(KeyPhase::Down, on_key.clone());
        let up = hub.add_listener(KeyPhase::Up, on_key);

        *keyboard = Some(KeyboardBinding {
            hub: hub.clone(),
            down,
            up,
        });
        log::debug!("Keyboard events bound");
        true
    }

    /// Remove the listeners added by [`bind_keyboard_events`](Self::bind_keyboard_events)
    ///
    /// Returns false if nothing was bound.
    pub fn unbind_keyboard_events(&self) -> bool {
        let Some(binding) = self.keyboard().take() else {
            return false;
        };
        binding.hub.remove_listener(binding.down);
        binding.hub.remove_listener(binding.up);
        log::debug!("Keyboard events unbound");
        true
    }

    pub fn is_keyboard_bound(&self) -> bool {
        self.keyboard().is_some()
    }

    fn keyboard(&self) -> MutexGuard<'_, Option<KeyboardBinding>> {
        self.inner.keyboard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
