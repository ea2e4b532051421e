//! The run-over overlay, faded in over the final playfield.

use sdl2::pixels::Color;
use sdl2::render::BlendMode;
use thousands::Separable;
use tracing::error;

use crate::constants::CANVAS_SIZE;
use crate::error::{GameError, GameResult};
use crate::input::Action;
use crate::render::DrawContext;
use crate::state::menu::MenuState;
use crate::state::{Below, State, StateContext, StateKind};

const ENTER_TICKS: f32 = 10.0;
const TINT: Color = Color::RGBA(10, 0, 0, 190);

pub struct GameOverState {
    score: u64,
    wave: u32,
    best: u64,
    new_best: bool,
    /// Highscore check done; runs once on the first tick.
    written: bool,
    fade: f32,
}

impl GameOverState {
    pub fn new(score: u64, wave: u32) -> Self {
        Self {
            score,
            wave,
            best: 0,
            new_best: false,
            written: false,
            fade: 0.0,
        }
    }

    /// Compares the run against the stored best and records a new one.
    /// Runs on the first tick so an immediate quit still keeps it.
    fn ensure_written(&mut self, ctx: &mut StateContext) {
        if self.written {
            return;
        }
        self.written = true;
        self.best = match ctx.saves.load_highscore() {
            Ok(best) => best,
            Err(err) => {
                error!(%err, "failed to load highscore");
                0
            }
        };
        if self.score > self.best {
            self.new_best = true;
            self.best = self.score;
            if let Err(err) = ctx.saves.save_highscore(self.score) {
                error!(%err, "failed to record highscore");
            }
        }
    }
}

impl State for GameOverState {
    fn kind(&self) -> StateKind {
        StateKind::GameOver
    }

    fn enter_duration(&self) -> f32 {
        ENTER_TICKS
    }

    fn userinput(&mut self, ctx: &mut StateContext) {
        if ctx.input.tapped(Action::Confirm) || ctx.input.tapped(Action::Back) {
            ctx.play_sound("ui_select", 1.0);
            ctx.pop_state();
            ctx.pop_state();
            ctx.push_state(Box::new(MenuState::new()));
        }
    }

    fn update(&mut self, ctx: &mut StateContext) {
        self.ensure_written(ctx);
        self.fade = 1.0;
    }

    fn update_on_enter(&mut self, ctx: &mut StateContext, fraction: f32) {
        self.ensure_written(ctx);
        self.fade = fraction;
    }

    fn draw(&self, gfx: &mut DrawContext, below: Below) -> GameResult<()> {
        gfx.lerp = 1.0;
        below.draw(gfx)?;

        let alpha = (f32::from(TINT.a) * self.fade) as u8;
        gfx.canvas.set_blend_mode(BlendMode::Blend);
        gfx.canvas.set_draw_color(Color::RGBA(TINT.r, TINT.g, TINT.b, alpha));
        gfx.canvas.fill_rect(None).map_err(GameError::Sdl)?;

        if self.fade < 1.0 {
            return Ok(());
        }
        let mid = CANVAS_SIZE.y / 2;
        gfx.draw_text_centered("GAME OVER", mid - 30, Color::WHITE)?;
        gfx.draw_text_centered(
            &format!("SCORE {}", self.score.separate_with_commas()),
            mid - 10,
            Color::WHITE,
        )?;
        gfx.draw_text_centered(&format!("WAVE {}", self.wave), mid + 2, Color::GRAY)?;
        let best_line = if self.new_best {
            "NEW BEST!".to_string()
        } else {
            format!("BEST {}", self.best.separate_with_commas())
        };
        gfx.draw_text_centered(&best_line, mid + 14, Color::YELLOW)?;
        gfx.draw_text_centered("ENTER FOR MENU", mid + 34, Color::GRAY)?;
        Ok(())
    }
}
