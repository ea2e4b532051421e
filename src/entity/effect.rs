//! One-shot visual effects: a flipbook that plays once and removes itself.

use glam::Vec2;

use crate::asset::GameData;
use crate::entity::{EntityCore, GameObject, UpdateContext};
use crate::error::GameResult;
use crate::render::DrawContext;
use crate::texture::animation::Animation;

pub struct Effect {
    core: EntityCore,
    clip: Animation,
}

impl Effect {
    pub fn new(data: &GameData, clip_name: &str, position: Vec2) -> GameResult<Self> {
        Ok(Self {
            core: EntityCore::new(position),
            clip: data.clip(clip_name)?,
        })
    }

    pub fn explosion(data: &GameData, position: Vec2) -> GameResult<Self> {
        Self::new(data, "fx/explosion", position)
    }

    pub fn spark(data: &GameData, position: Vec2) -> GameResult<Self> {
        Self::new(data, "fx/spark", position)
    }
}

impl GameObject for Effect {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn update(&mut self, _ctx: &mut UpdateContext) {
        self.clip.update();
        if self.clip.complete() {
            self.force_kill();
        }
    }

    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        if let Some(tile) = self.clip.frame(gfx.lerp) {
            gfx.draw_tile(tile, self.core.position + offset, 0.0)?;
        }
        Ok(())
    }

    fn draw_layer(&self) -> i32 {
        5
    }
}
