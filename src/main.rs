//! Dungeon3D - physics-driven 3D scene over a generated dungeon

use std::sync::{Arc, MutexGuard, PoisonError};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use dungeon3d::audio::{AudioSystem, ImpactSound, NullAudio, SoundBank};
use dungeon3d::config::AppConfig;
use dungeon3d::content::HttpContentService;
use dungeon3d::input::{InputAction, InputMapper};
use dungeon3d::scene::SceneBuilder;
use dungeon3d::state::{ApplicationState, SharedWorld};
use dungeon3d::systems::{CompassSystem, SimulationSystem, WindowSystem};
use dungeon_core::{SceneTemplate, World};
use dungeon_input::{KeyEvent, KeyboardHub};

/// Main application state
struct App {
    config: AppConfig,
    runtime: tokio::runtime::Runtime,
    state: ApplicationState<HttpContentService>,
    world: SharedWorld,
    hub: KeyboardHub,
    sound_bank: Arc<SoundBank>,
    music_playing: bool,
    /// Owns the collision handlers the spawned entities point at
    _scene_builder: SceneBuilder,
    simulation: SimulationSystem,
    compass: CompassSystem,
    window: Option<WindowSystem>,
    regenerations: u32,
}

impl App {
    fn new(config: AppConfig, seed: String) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let state = ApplicationState::new(
            HttpContentService::new(&config.content.base_url),
            config.content.dungeon_window,
            config.camera.start(),
        );

        let scene = SceneTemplate::load(&config.scene.path)
            .with_context(|| format!("failed to load scene '{}'", config.scene.path))?;
        let world = state.create_world(scene.physics_config(&config.physics.to_physics_config()))?;

        let audio: Arc<dyn AudioSystem> = Arc::new(NullAudio::new());
        let sound_bank = Arc::new(SoundBank::load(audio, &config.audio)?);
        sound_bank.start_music()?;

        // Content is optional for the scene: a missing service leaves the
        // default materials and is recorded in the store
        if let Err(e) = runtime.block_on(state.load_materials()) {
            log::warn!("Continuing without materials: {}", e);
        }
        if let Err(e) = runtime.block_on(state.load_object(1)) {
            log::warn!("Continuing without object 1: {}", e);
        }

        let materials = state
            .snapshot()
            .materials
            .iter()
            .map(|m| m.to_material())
            .collect();
        let scene_builder = SceneBuilder::new()
            .with_handler("cube_impact", Arc::new(ImpactSound::cube(Arc::clone(&sound_bank))))
            .with_handler("letter_impact", Arc::new(ImpactSound::letter(Arc::clone(&sound_bank))))
            .with_materials(materials);
        scene_builder.spawn_scene(&scene, &mut lock_world(&world))?;
        let compass = CompassSystem::spawn(&mut lock_world(&world), state.subscribe())?;

        let app = Self {
            simulation: SimulationSystem::new(&config.physics),
            compass,
            config,
            runtime,
            state,
            world,
            hub: KeyboardHub::new(),
            sound_bank,
            music_playing: true,
            _scene_builder: scene_builder,
            window: None,
            regenerations: 0,
        };
        app.request_dungeon(seed);
        app.state.bind_keyboard_events(&app.hub);
        Ok(app)
    }

    fn request_dungeon(&self, seed: String) {
        let state = self.state.clone();
        self.runtime.spawn(async move {
            if let Err(e) = state.create_dungeon_area(seed).await {
                log::error!("Dungeon generation failed: {}", e);
            }
        });
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::RegenerateDungeon => {
                self.regenerations += 1;
                let seed = format!("{}-{}", self.config.content.default_seed, self.regenerations);
                log::info!("Regenerating dungeon with seed {:?}", seed);
                self.request_dungeon(seed);
            }
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::ToggleMusic => {
                let result = if self.music_playing {
                    self.sound_bank.stop_music()
                } else {
                    self.sound_bank.start_music()
                };
                match result {
                    Ok(()) => self.music_playing = !self.music_playing,
                    Err(e) => {
                        log::error!("{}", e);
                        event_loop.exit();
                    }
                }
            }
        }
    }

    fn shutdown(&mut self) {
        self.state.unbind_keyboard_events();
        if self.music_playing {
            if let Err(e) = self.sound_bank.stop_music() {
                log::warn!("{}", e);
            }
        }
    }
}

fn lock_world(world: &SharedWorld) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            match WindowSystem::create(event_loop, &self.config.window) {
                Ok(window) => {
                    window.request_redraw();
                    self.window = Some(window);
                }
                Err(e) => {
                    log::error!("{}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    let key_event = KeyEvent::from_winit(code, event.state);
                    self.hub.dispatch(key_event);
                    if let Some(action) = InputMapper::map_keyboard(&key_event) {
                        self.handle_action(action, event_loop);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let entities = {
                    let mut world = lock_world(&self.world);
                    if let Err(e) = self.simulation.update(&mut world) {
                        log::error!("Simulation stopped: {}", e);
                        event_loop.exit();
                        return;
                    }
                    if let Err(e) = self.compass.update(&mut world) {
                        log::error!("Compass update failed: {}", e);
                    }
                    world.entity_count()
                };

                if let Some(window) = &self.window {
                    let snapshot = self.state.snapshot();
                    window.update_title(snapshot.seed(), entities);
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn run(config: AppConfig) -> anyhow::Result<()> {
    let seed = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.content.default_seed.clone());

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, seed)?;
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level)).init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Dungeon3D");

    if let Err(e) = run(config) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
