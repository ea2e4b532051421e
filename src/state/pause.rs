//! The pause overlay, faded in and out over the frozen playfield.

use sdl2::pixels::Color;
use sdl2::render::BlendMode;

use crate::constants::CANVAS_SIZE;
use crate::error::{GameError, GameResult};
use crate::input::Action;
use crate::render::DrawContext;
use crate::state::menu::MenuState;
use crate::state::{Below, State, StateContext, StateKind};

const ENTER_TICKS: f32 = 4.0;
const EXIT_TICKS: f32 = 3.0;
const TINT: Color = Color::RGBA(0, 0, 10, 160);

pub struct PauseState {
    /// Overlay strength in 0..=1, driven by the transition timers.
    fade: f32,
    /// Set when leaving for the menu, where the fade-out would stall the
    /// pops queued behind it.
    instant_exit: bool,
}

impl PauseState {
    pub fn new() -> Self {
        Self {
            fade: 0.0,
            instant_exit: false,
        }
    }
}

impl Default for PauseState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for PauseState {
    fn kind(&self) -> StateKind {
        StateKind::Pause
    }

    fn enter_duration(&self) -> f32 {
        ENTER_TICKS
    }

    fn exit_duration(&self) -> f32 {
        if self.instant_exit {
            0.0
        } else {
            EXIT_TICKS
        }
    }

    fn userinput(&mut self, ctx: &mut StateContext) {
        if ctx.input.tapped(Action::Pause) || ctx.input.tapped(Action::Confirm) {
            ctx.play_sound("ui_select", 1.0);
            ctx.pop_state();
        } else if ctx.input.tapped(Action::Back) {
            ctx.play_sound("ui_select", 1.0);
            // Leaving through the menu pops the run below too; it saves
            // itself on the way out.
            self.instant_exit = true;
            ctx.pop_state();
            ctx.pop_state();
            ctx.push_state(Box::new(MenuState::new()));
        }
    }

    fn update(&mut self, _ctx: &mut StateContext) {
        self.fade = 1.0;
    }

    fn update_on_enter(&mut self, _ctx: &mut StateContext, fraction: f32) {
        self.fade = fraction;
    }

    fn update_on_exit(&mut self, _ctx: &mut StateContext, fraction: f32) {
        self.fade = 1.0 - fraction;
    }

    fn draw(&self, gfx: &mut DrawContext, below: Below) -> GameResult<()> {
        // Freeze the playfield at its last simulated positions.
        gfx.lerp = 1.0;
        below.draw(gfx)?;

        let alpha = (f32::from(TINT.a) * self.fade) as u8;
        gfx.canvas.set_blend_mode(BlendMode::Blend);
        gfx.canvas.set_draw_color(Color::RGBA(TINT.r, TINT.g, TINT.b, alpha));
        gfx.canvas.fill_rect(None).map_err(GameError::Sdl)?;

        if self.fade >= 1.0 {
            let mid = CANVAS_SIZE.y / 2;
            gfx.draw_text_centered("PAUSED", mid - 16, Color::WHITE)?;
            gfx.draw_text_centered("P TO RESUME", mid + 4, Color::GRAY)?;
            gfx.draw_text_centered("ESC FOR MENU", mid + 16, Color::GRAY)?;
        }
        Ok(())
    }
}
