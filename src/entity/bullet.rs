//! Projectiles. Short-lived, hitbox-only, no bounce physics of their own.

use glam::Vec2;

use crate::entity::{interpolated_center, EntityCore, GameObject, Hitbox, UpdateContext, Velocity};
use crate::error::GameResult;
use crate::math::from_polar;
use crate::render::DrawContext;
use crate::texture::sprite::AtlasTile;
use crate::texture::sprites::{BulletSprite, GameSprite};

/// Updates a bullet survives before expiring on its own.
pub const LIFETIME_TICKS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSource {
    Player,
    Saucer,
}

pub struct Bullet {
    core: EntityCore,
    velocity: Velocity,
    hitbox: Hitbox,
    tile: AtlasTile,
    source: BulletSource,
    remaining_ticks: u32,
}

impl Bullet {
    pub fn new(position: Vec2, heading: f32, source: BulletSource) -> GameResult<Self> {
        let (sprite, speed) = match source {
            BulletSource::Player => (BulletSprite::Player, 12.0),
            BulletSource::Saucer => (BulletSprite::Saucer, 7.0),
        };
        let tile = crate::asset::tile(&GameSprite::Bullet(sprite).to_path())?;
        Ok(Self {
            core: EntityCore::new(position),
            velocity: Velocity::with_velocity(from_polar(heading, speed), speed),
            hitbox: Hitbox::new(Vec2::splat(4.0)),
            tile,
            source,
            remaining_ticks: LIFETIME_TICKS,
        })
    }

    pub fn source(&self) -> BulletSource {
        self.source
    }

    pub fn damage(&self) -> u32 {
        1
    }
}

impl GameObject for Bullet {
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
        self.velocity.update(&mut self.core.position);
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.force_kill();
        }
    }

    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        let center = interpolated_center(
            self.core.position,
            Some(self.velocity.velocity),
            gfx.lerp,
            offset,
        );
        gfx.draw_tile(self.tile, center, 0.0)
    }

    fn velocity(&self) -> Option<&Velocity> {
        Some(&self.velocity)
    }

    fn velocity_mut(&mut self) -> Option<&mut Velocity> {
        Some(&mut self.velocity)
    }

    fn hitbox(&self) -> Option<&Hitbox> {
        Some(&self.hitbox)
    }

    fn draw_layer(&self) -> i32 {
        4
    }
}
