//! Drifting rocks, the belt's bread and butter.
//!
//! Rocks come in three sizes. The larger two split into smaller rocks
//! when destroyed; every size plays a break animation before leaving the
//! simulation, and may drop a powerup.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum_macros::{AsRefStr, EnumIter};
use tracing::error;

use crate::asset::GameData;
use crate::entity::powerup::{Powerup, PowerupKind};
use crate::entity::{
    draw_rotation, interpolated_center, Body, Collider, EntityCore, GameObject, Hitbox,
    UpdateContext, Velocity,
};
use crate::error::{EntityError, GameResult};
use crate::math::from_polar;
use crate::platform;
use crate::render::DrawContext;
use crate::texture::animation::{AnimController, AnimSignals};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(self) -> f32 {
        match self {
            AsteroidSize::Large => 15.0,
            AsteroidSize::Medium => 9.0,
            AsteroidSize::Small => 5.0,
        }
    }

    pub fn hitbox(self) -> Vec2 {
        match self {
            AsteroidSize::Large => Vec2::splat(30.0),
            AsteroidSize::Medium => Vec2::splat(18.0),
            AsteroidSize::Small => Vec2::splat(10.0),
        }
    }

    pub fn health(self) -> u32 {
        match self {
            AsteroidSize::Large => 2,
            AsteroidSize::Medium => 1,
            AsteroidSize::Small => 1,
        }
    }

    /// Smaller rocks score more, like the arcade did it.
    pub fn score(self) -> u32 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    pub fn max_speed(self) -> f32 {
        match self {
            AsteroidSize::Large => 1.6,
            AsteroidSize::Medium => 2.4,
            AsteroidSize::Small => 3.4,
        }
    }

    /// What this size breaks into, if anything.
    pub fn splits(self) -> Option<(AsteroidSize, u32)> {
        match self {
            AsteroidSize::Large => Some((AsteroidSize::Medium, 2)),
            AsteroidSize::Medium => Some((AsteroidSize::Small, 2)),
            AsteroidSize::Small => None,
        }
    }

    pub fn powerup_chance(self) -> f64 {
        match self {
            AsteroidSize::Large => 0.2,
            AsteroidSize::Medium => 0.1,
            AsteroidSize::Small => 0.05,
        }
    }

    fn controller_name(self) -> &'static str {
        match self {
            AsteroidSize::Large => "rock_large",
            AsteroidSize::Medium => "rock_medium",
            AsteroidSize::Small => "rock_small",
        }
    }

    fn break_sound(self) -> &'static str {
        match self {
            AsteroidSize::Large | AsteroidSize::Medium => "explode_big",
            AsteroidSize::Small => "explode_small",
        }
    }
}

pub struct Asteroid {
    core: EntityCore,
    velocity: Velocity,
    body: Body,
    hitbox: Hitbox,
    collider: Collider,
    controller: AnimController,
    size: AsteroidSize,
    health: u32,
}

#[derive(Deserialize)]
struct SavedAsteroid {
    position: [f32; 2],
    velocity: [f32; 2],
    rotation: f32,
    angular_velocity: f32,
    size: AsteroidSize,
    health: u32,
}

impl Asteroid {
    pub const SAVE_KEY: &'static str = "asteroid";

    pub fn new(data: &GameData, position: Vec2, velocity: Vec2, size: AsteroidSize) -> GameResult<Self> {
        let mut rng = platform::rng();
        let mut body = Body::new(rng.random_range(-179.0..=180.0), 0.0);
        body.angular_velocity = rng.random_range(-3.0..3.0);
        Ok(Self {
            core: EntityCore::new(position),
            velocity: Velocity::with_velocity(velocity, size.max_speed()),
            body,
            hitbox: Hitbox::new(size.hitbox()),
            collider: Collider::new(size.radius(), 0.95),
            controller: data.controller(size.controller_name())?,
            size,
            health: size.health(),
        })
    }

    /// Spawns a rock drifting in a random direction at a size-appropriate
    /// speed.
    pub fn drifting(data: &GameData, position: Vec2, size: AsteroidSize) -> GameResult<Self> {
        let mut rng = platform::rng();
        let heading = rng.random_range(0.0..360.0);
        let speed = rng.random_range(size.max_speed() * 0.4..size.max_speed() * 0.9);
        Self::new(data, position, from_polar(heading, speed), size)
    }

    pub fn from_save(data: &GameData, fields: &Value) -> GameResult<Box<dyn GameObject>> {
        let saved: SavedAsteroid =
            serde_json::from_value(fields.clone()).map_err(|err| EntityError::BadRecord {
                key: Self::SAVE_KEY.to_string(),
                reason: err.to_string(),
            })?;
        let mut rock = Self::new(
            data,
            Vec2::from(saved.position),
            Vec2::from(saved.velocity),
            saved.size,
        )?;
        rock.body.rotation = saved.rotation;
        rock.body.angular_velocity = saved.angular_velocity;
        rock.health = saved.health.max(1);
        Ok(Box::new(rock))
    }

    pub fn size(&self) -> AsteroidSize {
        self.size
    }

    fn spawn_splits(&self, ctx: &mut UpdateContext) {
        let Some((child_size, count)) = self.size.splits() else {
            return;
        };
        let tags = ctx.tags;
        let mut rng = platform::rng();
        let base = rng.random_range(0.0..360.0);
        for index in 0..count {
            let heading =
                base + index as f32 * (360.0 / count as f32) + rng.random_range(-20.0..20.0);
            let offset = from_polar(heading, self.size.radius() * 0.5);
            let speed = rng.random_range(child_size.max_speed() * 0.4..child_size.max_speed() * 0.9);
            match Asteroid::new(
                ctx.data,
                self.core.position + offset,
                from_polar(heading, speed),
                child_size,
            ) {
                Ok(child) => ctx.spawn_tagged(Box::new(child), &[tags.rocks]),
                Err(err) => error!(%err, "failed to spawn split rock"),
            }
        }
    }

    fn maybe_drop_powerup(&self, ctx: &mut UpdateContext) {
        let tags = ctx.tags;
        let mut rng = platform::rng();
        if !rng.random_bool(self.size.powerup_chance()) {
            return;
        }
        let kind = PowerupKind::random(&mut rng);
        match Powerup::new(ctx.data, self.core.position, kind) {
            Ok(pickup) => ctx.spawn_tagged(Box::new(pickup), &[tags.pickups]),
            Err(err) => error!(%err, "failed to spawn powerup"),
        }
    }
}

impl GameObject for Asteroid {
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
        if !self.core.dying {
            self.velocity.update(&mut self.core.position);
            self.body.update();
        }
        let signals = AnimSignals {
            speed: self.velocity.speed(),
            health_zero: self.health == 0,
            ..AnimSignals::default()
        };
        if let Err(err) = self.controller.update(&signals) {
            error!(%err, "rock animation failed");
        }
        if self.core.dying && self.controller.animations_complete() {
            self.core.removed = true;
        }
    }

    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        let center = interpolated_center(
            self.core.position,
            Some(self.velocity.velocity),
            gfx.lerp,
            offset,
        );
        let angle = draw_rotation(
            self.body.rotation,
            self.body.angular_velocity,
            gfx.lerp,
            self.body.extra_rotation,
        );
        for tile in self.controller.frames(gfx.lerp) {
            gfx.draw_tile(tile, center, angle as f64)?;
        }
        Ok(())
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

    fn collider(&self) -> Option<&Collider> {
        Some(&self.collider)
    }

    fn hit(&mut self, damage: u32, ctx: &mut UpdateContext) {
        if self.core.dying {
            return;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.kill(ctx);
        } else {
            self.core.play_sound("explode_small");
        }
    }

    /// Stops the rock and starts its break-up: splits and a possible
    /// powerup spawn happen here, removal waits for the animation.
    fn kill(&mut self, ctx: &mut UpdateContext) {
        if self.core.dying {
            return;
        }
        self.core.dying = true;
        self.health = 0;
        self.velocity.velocity = Vec2::ZERO;
        self.body.angular_velocity = 0.0;
        self.core.play_sound(self.size.break_sound());
        self.spawn_splits(ctx);
        self.maybe_drop_powerup(ctx);
    }

    fn score_value(&self) -> u32 {
        self.size.score()
    }

    fn save_key(&self) -> Option<&'static str> {
        Some(Self::SAVE_KEY)
    }

    fn save_fields(&self) -> GameResult<Value> {
        Ok(json!({
            "position": [self.core.position.x, self.core.position.y],
            "velocity": [self.velocity.velocity.x, self.velocity.velocity.y],
            "rotation": self.body.rotation,
            "angular_velocity": self.body.angular_velocity,
            "size": self.size,
            "health": self.health,
        }))
    }
}
