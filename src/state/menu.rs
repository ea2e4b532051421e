//! The title menu: continue a saved run, start fresh, or quit.

use glam::Vec2;
use rand::Rng;
use sdl2::pixels::Color;
use smallvec::SmallVec;
use thousands::Separable;
use tracing::{error, info};

use crate::asset;
use crate::constants::CANVAS_SIZE;
use crate::entity::asteroid::AsteroidSize;
use crate::error::{GameResult, SaveError};
use crate::input::Action;
use crate::platform;
use crate::render::DrawContext;
use crate::save::SaveRecord;
use crate::state::play::PlayState;
use crate::state::{Below, State, StateContext, StateKind};
use crate::texture::sprites::{GameSprite, RockSprite, ShipSprite, StarSprite};

const STAR_COUNT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Continue,
    NewGame,
    Quit,
}

impl MenuOption {
    fn label(self) -> &'static str {
        match self {
            MenuOption::Continue => "CONTINUE",
            MenuOption::NewGame => "NEW GAME",
            MenuOption::Quit => "QUIT",
        }
    }
}

pub struct MenuState {
    selected: usize,
    /// The saved run found on disk, offered behind CONTINUE.
    record: Option<SaveRecord>,
    /// Save probing happens on the first tick, not at construction.
    probed: bool,
    /// A run file existed but would not parse; shown, then ignored.
    save_damaged: bool,
    highscore: u64,
    stars: Vec<(Vec2, bool)>,
}

impl MenuState {
    pub fn new() -> Self {
        let mut rng = platform::rng();
        let stars = (0..STAR_COUNT)
            .map(|_| {
                let position = Vec2::new(
                    rng.random_range(0.0..CANVAS_SIZE.x as f32),
                    rng.random_range(0.0..CANVAS_SIZE.y as f32),
                );
                (position, rng.random_bool(0.3))
            })
            .collect();
        Self {
            selected: 0,
            record: None,
            probed: false,
            save_damaged: false,
            highscore: 0,
            stars,
        }
    }

    fn options(&self) -> SmallVec<[MenuOption; 3]> {
        let mut options = SmallVec::new();
        if self.record.is_some() {
            options.push(MenuOption::Continue);
        }
        options.push(MenuOption::NewGame);
        options.push(MenuOption::Quit);
        options
    }

    fn probe_saves(&mut self, ctx: &StateContext) {
        if self.probed {
            return;
        }
        self.probed = true;
        match ctx.saves.load_run() {
            Ok(record) => self.record = record,
            Err(err @ SaveError::Corrupted(_)) => {
                error!(%err, "run save is damaged, ignoring it");
                self.save_damaged = true;
            }
            Err(err) => error!(%err, "failed to read run save"),
        }
        match ctx.saves.load_highscore() {
            Ok(best) => self.highscore = best,
            Err(err) => error!(%err, "failed to read highscore"),
        }
    }

    fn confirm(&mut self, ctx: &mut StateContext) {
        let options = self.options();
        let Some(&option) = options.get(self.selected) else {
            return;
        };
        ctx.play_sound("ui_select", 1.0);
        match option {
            MenuOption::Continue => {
                let Some(record) = &self.record else {
                    return;
                };
                match PlayState::from_save(ctx.data, ctx.registry, record) {
                    Ok(play) => {
                        info!(level = %record.level, "continuing saved run");
                        ctx.pop_state();
                        ctx.push_state(Box::new(play));
                    }
                    Err(err) => {
                        error!(%err, "saved run did not restore, ignoring it");
                        self.record = None;
                        self.save_damaged = true;
                        self.selected = 0;
                    }
                }
            }
            MenuOption::NewGame => match PlayState::new(ctx.data) {
                Ok(play) => {
                    info!("starting new run");
                    ctx.pop_state();
                    ctx.push_state(Box::new(play));
                }
                Err(err) => error!(%err, "failed to start run"),
            },
            MenuOption::Quit => ctx.pop_state(),
        }
    }

    fn draw_decoration(&self, gfx: &mut DrawContext) -> GameResult<()> {
        let dim = asset::tile(&GameSprite::Star(StarSprite::Dim).to_path())?;
        let bright = asset::tile(&GameSprite::Star(StarSprite::Bright).to_path())?;
        for &(position, is_bright) in &self.stars {
            gfx.draw_tile(if is_bright { bright } else { dim }, position, 0.0)?;
        }
        let large = asset::tile(&GameSprite::Rock(RockSprite::Drift(AsteroidSize::Large)).to_path())?;
        let medium = asset::tile(&GameSprite::Rock(RockSprite::Drift(AsteroidSize::Medium)).to_path())?;
        let hull = asset::tile(&GameSprite::Ship(ShipSprite::Hull).to_path())?;
        gfx.draw_tile(large, Vec2::new(70.0, 200.0), 25.0)?;
        gfx.draw_tile(medium, Vec2::new(410.0, 70.0), -40.0)?;
        gfx.draw_tile(hull, Vec2::new(240.0, 210.0), 0.0)?;
        Ok(())
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for MenuState {
    fn kind(&self) -> StateKind {
        StateKind::Menu
    }

    fn userinput(&mut self, ctx: &mut StateContext) {
        let count = self.options().len();
        if ctx.input.tapped(Action::Up) && self.selected > 0 {
            self.selected -= 1;
            ctx.play_sound("ui_move", 1.0);
        }
        if ctx.input.tapped(Action::Down) && self.selected + 1 < count {
            self.selected += 1;
            ctx.play_sound("ui_move", 1.0);
        }
        if ctx.input.tapped(Action::Confirm) {
            self.confirm(ctx);
        }
        if ctx.input.tapped(Action::Back) {
            ctx.pop_state();
        }
    }

    fn update(&mut self, ctx: &mut StateContext) {
        self.probe_saves(ctx);
    }

    fn draw(&self, gfx: &mut DrawContext, _below: Below) -> GameResult<()> {
        self.draw_decoration(gfx)?;

        gfx.draw_text_centered("DRIFTBELT", 48, Color::WHITE)?;
        if self.highscore > 0 {
            gfx.draw_text_centered(
                &format!("BEST {}", self.highscore.separate_with_commas()),
                66,
                Color::YELLOW,
            )?;
        }

        let mut y = 110;
        for (index, option) in self.options().into_iter().enumerate() {
            let color = if index == self.selected {
                Color::WHITE
            } else {
                Color::GRAY
            };
            let label = if index == self.selected {
                format!("> {} <", option.label())
            } else {
                option.label().to_string()
            };
            gfx.draw_text_centered(&label, y, color)?;
            y += 14;
        }

        if self.save_damaged {
            gfx.draw_text_centered("SAVE DATA DAMAGED", CANVAS_SIZE.y - 28, Color::RED)?;
        }
        gfx.draw_text_centered("ARROWS MOVE  ENTER SELECTS", CANVAS_SIZE.y - 14, Color::GRAY)?;
        Ok(())
    }
}
