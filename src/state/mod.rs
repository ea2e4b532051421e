//! Layered game states.
//!
//! The stack owns every live state. Only the top state receives input and
//! updates; the pass-through draw hands each state a view of the states
//! below it, so a pause menu can tint the frozen playfield it covers.
//! States enter and leave through optional transition timers: while one
//! runs, the state is fed a completion fraction instead of its normal
//! update.

pub mod gameover;
pub mod menu;
pub mod pause;
pub mod play;

use strum_macros::Display;
use tracing::{debug, error};

use crate::asset::GameData;
use crate::audio::SoundRequest;
use crate::entity::registry::EntityRegistry;
use crate::error::{GameResult, StateError};
use crate::input::InputFrame;
use crate::render::DrawContext;
use crate::save::SaveStore;
use crate::timing::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StateKind {
    Menu,
    Play,
    Pause,
    GameOver,
}

/// A request a state makes against the stack, applied between ticks.
pub enum StackCommand {
    Push(Box<dyn State>),
    Pop,
}

/// What a state may touch while handling input or updating.
pub struct StateContext<'a> {
    pub input: &'a InputFrame,
    pub data: &'a GameData,
    pub registry: &'a EntityRegistry,
    pub saves: &'a SaveStore,
    /// Sounds queued this tick, dispatched by the scheduler.
    pub sounds: Vec<SoundRequest>,
    /// Stack changes requested this tick.
    pub commands: Vec<StackCommand>,
}

impl StateContext<'_> {
    pub fn play_sound(&mut self, name: &'static str, volume: f32) {
        self.sounds.push(SoundRequest::new(name, volume));
    }

    pub fn push_state(&mut self, state: Box<dyn State>) {
        self.commands.push(StackCommand::Push(state));
    }

    pub fn pop_state(&mut self) {
        self.commands.push(StackCommand::Pop);
    }
}

pub trait State: Send + Sync {
    fn kind(&self) -> StateKind;

    /// Ticks the enter transition takes; zero enters instantly.
    fn enter_duration(&self) -> f32 {
        0.0
    }

    /// Ticks the exit transition takes; zero leaves instantly on pop.
    fn exit_duration(&self) -> f32 {
        0.0
    }

    /// Whether the state keeps receiving input mid-transition.
    fn input_during_transitions(&self) -> bool {
        false
    }

    /// Handles this tick's input. Runs before `update`, top state only.
    fn userinput(&mut self, ctx: &mut StateContext) {
        let _ = ctx;
    }

    /// Advances the state one tick while fully active.
    fn update(&mut self, ctx: &mut StateContext);

    /// Advances the enter transition; `fraction` is completion in 0..=1.
    fn update_on_enter(&mut self, ctx: &mut StateContext, fraction: f32) {
        let _ = (ctx, fraction);
    }

    /// Advances the exit transition; `fraction` is completion in 0..=1.
    fn update_on_exit(&mut self, ctx: &mut StateContext, fraction: f32) {
        let _ = (ctx, fraction);
    }

    fn draw(&self, gfx: &mut DrawContext, below: Below) -> GameResult<()>;

    /// Teardown hook: runs exactly once when the state leaves the stack,
    /// including at shutdown. Persistence happens here.
    fn quit(&mut self, saves: &SaveStore) -> GameResult<()> {
        let _ = saves;
        Ok(())
    }
}

enum Phase {
    Entering(Timer),
    Active,
    Exiting(Timer),
}

struct StackEntry {
    state: Box<dyn State>,
    phase: Phase,
}

/// The states below the one currently drawing.
pub struct Below<'a> {
    entries: &'a [StackEntry],
}

impl Below<'_> {
    /// Draws the next state down, which receives its own view of what
    /// lies below it.
    pub fn draw(&self, gfx: &mut DrawContext) -> GameResult<()> {
        draw_slice(self.entries, gfx)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn draw_slice(entries: &[StackEntry], gfx: &mut DrawContext) -> GameResult<()> {
    match entries.split_last() {
        Some((top, rest)) => top.state.draw(gfx, Below { entries: rest }),
        None => Ok(()),
    }
}

#[derive(Default)]
pub struct StateStack {
    entries: Vec<StackEntry>,
}

impl StateStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn top_kind(&self) -> Option<StateKind> {
        self.entries.last().map(|entry| entry.state.kind())
    }

    /// Pushes a state. A kind already anywhere on the stack is refused
    /// and the stack is left unchanged.
    pub fn push(&mut self, state: Box<dyn State>) -> GameResult<()> {
        if self.entries.iter().any(|entry| entry.state.kind() == state.kind()) {
            return Err(StateError::DuplicateState(state.kind().to_string()).into());
        }
        let enter = state.enter_duration();
        let phase = if enter > 0.0 {
            Phase::Entering(Timer::new(enter))
        } else {
            Phase::Active
        };
        debug!(kind = %state.kind(), "Pushed state");
        self.entries.push(StackEntry { state, phase });
        Ok(())
    }

    /// Pops the top state. With a positive exit duration the state stays
    /// on as exiting and leaves once its timer completes; with zero it
    /// leaves now, `quit` running synchronously. Popping a state already
    /// exiting does nothing.
    pub fn pop(&mut self, saves: &SaveStore) -> GameResult<()> {
        if self.entries.is_empty() {
            return Err(StateError::PopOnEmpty.into());
        }
        let top = self.entries.len() - 1;
        {
            let entry = &mut self.entries[top];
            if matches!(entry.phase, Phase::Exiting(_)) {
                return Ok(());
            }
            let exit = entry.state.exit_duration();
            if exit > 0.0 {
                entry.phase = Phase::Exiting(Timer::new(exit));
                return Ok(());
            }
        }
        if let Some(mut entry) = self.entries.pop() {
            debug!(kind = %entry.state.kind(), "Popped state");
            entry.state.quit(saves)?;
        }
        Ok(())
    }

    /// Routes this tick's input to the top state, unless it is
    /// mid-transition and opted out.
    pub fn userinput(&mut self, ctx: &mut StateContext) {
        let Some(entry) = self.entries.last_mut() else {
            return;
        };
        let transitioning = !matches!(entry.phase, Phase::Active);
        if transitioning && !entry.state.input_during_transitions() {
            return;
        }
        entry.state.userinput(ctx);
    }

    /// Advances the top state one tick: its transition when one is
    /// running, its normal update otherwise.
    pub fn update(&mut self, ctx: &mut StateContext) -> GameResult<()> {
        let Some(top) = self.entries.len().checked_sub(1) else {
            return Ok(());
        };
        let mut exited = false;
        {
            let entry = &mut self.entries[top];
            match &mut entry.phase {
                Phase::Entering(timer) => {
                    let done = timer.update(1.0);
                    let fraction = timer.fraction();
                    entry.state.update_on_enter(ctx, fraction);
                    if done {
                        entry.phase = Phase::Active;
                    }
                }
                Phase::Active => entry.state.update(ctx),
                Phase::Exiting(timer) => {
                    let done = timer.update(1.0);
                    let fraction = timer.fraction();
                    entry.state.update_on_exit(ctx, fraction);
                    exited = done;
                }
            }
        }
        if exited {
            if let Some(mut entry) = self.entries.pop() {
                debug!(kind = %entry.state.kind(), "Popped state");
                entry.state.quit(ctx.saves)?;
            }
        }
        Ok(())
    }

    /// Applies the stack changes states requested this tick, in order.
    pub fn apply(&mut self, commands: Vec<StackCommand>, saves: &SaveStore) -> GameResult<()> {
        for command in commands {
            match command {
                StackCommand::Push(state) => self.push(state)?,
                StackCommand::Pop => self.pop(saves)?,
            }
        }
        Ok(())
    }

    /// Draws the whole stack through the top state's pass-through view.
    pub fn draw(&self, gfx: &mut DrawContext) -> GameResult<()> {
        draw_slice(&self.entries, gfx)
    }

    /// Tears down every remaining state, top first. Teardown is
    /// best-effort: every `quit` runs, the first error is returned,
    /// later ones are logged.
    pub fn quit_all(&mut self, saves: &SaveStore) -> GameResult<()> {
        let mut result = Ok(());
        while let Some(mut entry) = self.entries.pop() {
            if let Err(err) = entry.state.quit(saves) {
                if result.is_ok() {
                    result = Err(err);
                } else {
                    error!(%err, "state teardown failed");
                }
            }
        }
        result
    }
}
