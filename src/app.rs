//! The application shell: window, threads, and the two loops.
//!
//! The main thread owns every SDL resource (window, canvas, event pump,
//! mixer) and runs the render loop. A spawned simulation thread is the
//! sole writer of game state, ticking at a fixed rate; the render loop
//! only ever reads, interpolating between the last two ticks. The two
//! share the state stack behind a lock, raw input going one way and
//! sound requests the other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use sdl2::event::{Event, WindowEvent};
use sdl2::image::LoadTexture;
use sdl2::pixels::Color;
use sdl2::render::{ScaleMode, Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::{AudioSubsystem, EventPump};
use tracing::{debug, error, info, warn};

use crate::asset::{self, Asset, GameData};
use crate::audio::{Audio, SoundRequest};
use crate::constants::{CANVAS_SIZE, LOOP_TIME, SCALE, TICKRATE, TICK_DURATION};
use crate::entity::registry::EntityRegistry;
use crate::error::{GameError, GameResult};
use crate::formatter;
use crate::input::{Action, Bindings, RawInput};
use crate::platform;
use crate::profiling::FrameTiming;
use crate::render::DrawContext;
use crate::save::SaveStore;
use crate::state::menu::MenuState;
use crate::state::{StateContext, StateStack};
use crate::texture::sprite::SpriteAtlas;
use crate::texture::text::TextTexture;
use crate::timing::TickClock;

/// Frames between periodic render timing log lines.
const TIMING_LOG_INTERVAL: u64 = 600;

/// Everything shared between the render and simulation threads.
struct Shared {
    stack: RwLock<StateStack>,
    raw_input: Mutex<RawInput>,
    clock: Mutex<TickClock>,
    running: AtomicBool,
    /// The first error that stopped the simulation thread, if any.
    failure: Mutex<Option<GameError>>,
    data: GameData,
    saves: SaveStore,
    registry: EntityRegistry,
}

pub struct App {
    shared: Arc<Shared>,
    sim_thread: Option<JoinHandle<()>>,
    sounds: Receiver<SoundRequest>,
    audio: Audio,
    canvas: WindowCanvas,
    event_pump: EventPump,
    backbuffer: Texture,
    _texture_creator: TextureCreator<WindowContext>,
    /// Keeps SDL audio initialized for as long as the mixer plays.
    _audio_subsystem: AudioSubsystem,
    atlas: SpriteAtlas,
    text: TextTexture,
    bindings: Bindings,
    timing: FrameTiming,
    focused: bool,
    frame: u64,
}

impl App {
    /// Brings up SDL, loads every asset, and starts the simulation thread
    /// with the menu on the stack.
    pub fn new() -> GameResult<Self> {
        let sdl_context = sdl2::init().map_err(GameError::Sdl)?;
        let video_subsystem = sdl_context.video().map_err(GameError::Sdl)?;
        let audio_subsystem = sdl_context.audio().map_err(GameError::Sdl)?;

        let window = video_subsystem
            .window(
                "Driftbelt",
                (CANVAS_SIZE.x as f32 * SCALE).round() as u32,
                (CANVAS_SIZE.y as f32 * SCALE).round() as u32,
            )
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| GameError::Sdl(e.to_string()))?;

        let mut canvas = window
            .into_canvas()
            .build()
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        canvas
            .set_logical_size(CANVAS_SIZE.x, CANVAS_SIZE.y)
            .map_err(|e| GameError::Sdl(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let atlas_texture = texture_creator
            .load_texture_bytes(Asset::AtlasImage.bytes())
            .map_err(GameError::Sdl)?;
        let atlas = SpriteAtlas::new(atlas_texture, asset::atlas_mapper());
        let mut backbuffer = texture_creator
            .create_texture_target(None, CANVAS_SIZE.x, CANVAS_SIZE.y)
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        backbuffer.set_scale_mode(ScaleMode::Nearest);

        let mut audio = Audio::new()?;
        audio.set_mute(cfg!(debug_assertions));

        let event_pump = sdl_context.event_pump().map_err(GameError::Sdl)?;

        let mut stack = StateStack::new();
        stack.push(Box::new(MenuState::new()))?;

        let shared = Arc::new(Shared {
            stack: RwLock::new(stack),
            raw_input: Mutex::new(RawInput::default()),
            clock: Mutex::new(TickClock::new(TICKRATE)),
            running: AtomicBool::new(true),
            failure: Mutex::new(None),
            data: GameData::load()?,
            saves: SaveStore::new(),
            registry: EntityRegistry::standard(),
        });

        let (sound_tx, sound_rx) = mpsc::channel();
        let sim_shared = Arc::clone(&shared);
        let sim_thread = std::thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || sim_loop(sim_shared, sound_tx))?;

        Ok(Self {
            shared,
            sim_thread: Some(sim_thread),
            sounds: sound_rx,
            audio,
            canvas,
            event_pump,
            backbuffer,
            _texture_creator: texture_creator,
            _audio_subsystem: audio_subsystem,
            atlas,
            text: TextTexture::new(1.0),
            bindings: Bindings::default(),
            timing: FrameTiming::new(),
            focused: true,
            frame: 0,
        })
    }

    /// The render loop. Returns once the stack empties, the window closes,
    /// or the simulation fails; shutdown runs either way.
    pub fn run(&mut self) -> GameResult<()> {
        info!("entering render loop");
        while self.shared.running.load(Ordering::Relaxed) {
            let start = Instant::now();

            self.pump_events();
            self.play_sounds();
            if let Err(err) = self.draw_frame() {
                error!(%err, "render failed");
                if let Err(shutdown_err) = self.shutdown() {
                    error!(%shutdown_err, "shutdown after render failure also failed");
                }
                return Err(err);
            }

            let elapsed = start.elapsed();
            if elapsed < LOOP_TIME {
                platform::sleep(LOOP_TIME - elapsed, self.focused);
            }
            self.timing.record(start.elapsed());
            self.frame += 1;
            if self.frame % TIMING_LOG_INTERVAL == 0 {
                debug!(render = %self.timing.summary(), "frame timing");
            }
        }
        self.shutdown()
    }

    /// Feeds window and keyboard events into the shared input, handling
    /// the app-level keys (quit, mute) here.
    fn pump_events(&mut self) {
        while let Some(event) = self.event_pump.poll_event() {
            match event {
                Event::Quit { .. } => {
                    info!("window closed, shutting down");
                    self.shared.running.store(false, Ordering::Relaxed);
                }
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::FocusGained => self.focused = true,
                    WindowEvent::FocusLost => self.focused = false,
                    _ => {}
                },
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    let Some(action) = self.bindings.action(key) else {
                        continue;
                    };
                    if action == Action::Mute {
                        let mute = !self.audio.is_muted();
                        self.audio.set_mute(mute);
                        info!(muted = mute, "audio toggled");
                    } else {
                        self.shared.raw_input.lock().key_down(action);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(action) = self.bindings.action(key) {
                        self.shared.raw_input.lock().key_up(action);
                    }
                }
                _ => {}
            }
        }
    }

    /// Drains the simulation's sound requests into the mixer.
    fn play_sounds(&mut self) {
        while let Ok(request) = self.sounds.try_recv() {
            if let Err(err) = self.audio.play(&request) {
                warn!(%err, sound = request.name, "sound playback failed");
            }
        }
    }

    /// Renders the stack to the pixel backbuffer, then scales it onto the
    /// window.
    fn draw_frame(&mut self) -> GameResult<()> {
        let lerp = self.shared.clock.lock().lerp_amount(Instant::now());
        let stack = self.shared.stack.read();
        let atlas = &mut self.atlas;
        let text = &mut self.text;
        let mut drawn = Ok(());
        self.canvas
            .with_texture_canvas(&mut self.backbuffer, |texture_canvas| {
                texture_canvas.set_draw_color(Color::BLACK);
                texture_canvas.clear();
                let mut gfx = DrawContext {
                    canvas: texture_canvas,
                    atlas,
                    text,
                    lerp,
                };
                drawn = stack.draw(&mut gfx);
            })
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        drawn?;
        drop(stack);

        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas
            .copy(&self.backbuffer, None, None)
            .map_err(GameError::Sdl)?;
        self.canvas.present();
        Ok(())
    }

    /// Orderly teardown: stop the simulation, join it, then run every
    /// remaining state's `quit` so runs persist. SDL resources release
    /// when the app drops.
    fn shutdown(&mut self) -> GameResult<()> {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.sim_thread.take() {
            if handle.join().is_err() {
                error!("simulation thread panicked");
            }
        }
        let quit_result = self.shared.stack.write().quit_all(&self.shared.saves);
        if let Err(err) = &quit_result {
            error!(%err, "final state flush failed");
        }
        info!("shutdown complete");
        if let Some(err) = self.shared.failure.lock().take() {
            return Err(err);
        }
        quit_result
    }
}

/// The fixed-rate loop the simulation thread runs until told to stop or
/// the stack empties.
fn sim_loop(shared: Arc<Shared>, sounds: Sender<SoundRequest>) {
    info!("simulation thread started");
    while shared.running.load(Ordering::Relaxed) {
        let started = Instant::now();

        if let Err(err) = sim_tick(&shared, &sounds) {
            error!(%err, "simulation stopped");
            *shared.failure.lock() = Some(err);
            shared.running.store(false, Ordering::Relaxed);
            break;
        }
        if shared.stack.read().is_empty() {
            debug!("state stack empty, shutting down");
            shared.running.store(false, Ordering::Relaxed);
            break;
        }

        let elapsed = started.elapsed();
        if elapsed < TICK_DURATION {
            platform::sleep(TICK_DURATION - elapsed, true);
        } else {
            warn!(over = ?(elapsed - TICK_DURATION), "simulation tick over budget");
        }
    }
    info!("simulation thread stopped");
}

/// One simulation step: input to the top state, its update, then the
/// stack changes it requested.
fn sim_tick(shared: &Shared, sounds: &Sender<SoundRequest>) -> GameResult<()> {
    let input = shared.raw_input.lock().next_frame();
    let mut ctx = StateContext {
        input: &input,
        data: &shared.data,
        registry: &shared.registry,
        saves: &shared.saves,
        sounds: Vec::new(),
        commands: Vec::new(),
    };

    {
        let mut stack = shared.stack.write();
        stack.userinput(&mut ctx);
        stack.update(&mut ctx)?;
        let commands = std::mem::take(&mut ctx.commands);
        stack.apply(commands, &shared.saves)?;
    }

    shared.clock.lock().mark_tick(Instant::now());
    formatter::mark_tick();

    for request in ctx.sounds.drain(..) {
        // A closed channel means the render side is already gone.
        if sounds.send(request).is_err() {
            break;
        }
    }
    Ok(())
}
