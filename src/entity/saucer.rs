//! The patrol saucer. Drifts across the belt, re-aims at the player on a
//! timer, and fires loosely aimed shots when the player is in range.

use glam::Vec2;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::asset::GameData;
use crate::entity::bullet::{Bullet, BulletSource};
use crate::entity::powerup::{Powerup, PowerupKind};
use crate::entity::{
    interpolated_center, Collider, EntityCore, GameObject, Hitbox, UpdateContext, Velocity,
};
use crate::error::{EntityError, GameResult};
use crate::math::{angle_of, from_polar};
use crate::platform;
use crate::render::DrawContext;
use crate::texture::animation::{AnimController, AnimSignals};
use crate::timing::Timer;

const SPEED: f32 = 2.2;
const MAX_SPEED: f32 = 2.5;
const RETARGET_TICKS: f32 = 40.0;
const FIRE_TICKS: f32 = 25.0;
const FIRE_RANGE: f32 = 320.0;
const AIM_JITTER: f32 = 8.0;
const POWERUP_CHANCE: f64 = 0.3;

pub struct Saucer {
    core: EntityCore,
    velocity: Velocity,
    hitbox: Hitbox,
    collider: Collider,
    controller: AnimController,
    retarget: Timer,
    trigger: Timer,
    health: u32,
}

#[derive(Deserialize)]
struct SavedSaucer {
    position: [f32; 2],
    velocity: [f32; 2],
    health: u32,
}

impl Saucer {
    pub const SAVE_KEY: &'static str = "saucer";

    pub fn new(data: &GameData, position: Vec2) -> GameResult<Self> {
        let mut rng = platform::rng();
        let heading = rng.random_range(0.0..360.0);
        Ok(Self {
            core: EntityCore::new(position),
            velocity: Velocity::with_velocity(from_polar(heading, SPEED), MAX_SPEED),
            hitbox: Hitbox::new(Vec2::new(20.0, 12.0)),
            collider: Collider::new(9.0, 0.6),
            controller: data.controller("saucer")?,
            retarget: Timer::looping(RETARGET_TICKS),
            trigger: Timer::looping(FIRE_TICKS),
            health: 3,
        })
    }

    pub fn from_save(data: &GameData, fields: &Value) -> GameResult<Box<dyn GameObject>> {
        let saved: SavedSaucer =
            serde_json::from_value(fields.clone()).map_err(|err| EntityError::BadRecord {
                key: Self::SAVE_KEY.to_string(),
                reason: err.to_string(),
            })?;
        let mut saucer = Self::new(data, Vec2::from(saved.position))?;
        saucer.velocity.velocity = Vec2::from(saved.velocity);
        saucer.health = saved.health.max(1);
        Ok(Box::new(saucer))
    }

    /// New drift heading, biased toward the player when one exists.
    fn pick_heading(&mut self, player: Option<Vec2>) {
        let mut rng = platform::rng();
        let heading = match player {
            Some(player) => {
                angle_of(player - self.core.position) + rng.random_range(-60.0..60.0)
            }
            None => rng.random_range(0.0..360.0),
        };
        self.velocity.velocity = from_polar(heading, SPEED);
    }

    fn fire(&mut self, ctx: &mut UpdateContext) {
        let Some(player) = ctx.view.player_pos else {
            return;
        };
        if self.core.position.distance(player) > FIRE_RANGE {
            return;
        }
        let tags = ctx.tags;
        let mut rng = platform::rng();
        let aim = angle_of(player - self.core.position) + rng.random_range(-AIM_JITTER..AIM_JITTER);
        let muzzle = self.core.position + from_polar(aim, 12.0);
        match Bullet::new(muzzle, aim, BulletSource::Saucer) {
            Ok(bullet) => {
                ctx.spawn_tagged(Box::new(bullet), &[tags.bullets]);
                self.core.play_sound("saucer_laser");
            }
            Err(err) => error!(%err, "failed to spawn saucer bullet"),
        }
    }
}

impl GameObject for Saucer {
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

    fn update(&mut self, ctx: &mut UpdateContext) {
        if self.core.dying {
            let signals = AnimSignals {
                health_zero: true,
                ..AnimSignals::default()
            };
            if let Err(err) = self.controller.update(&signals) {
                error!(%err, "saucer animation failed");
            }
            if self.controller.animations_complete() {
                self.core.removed = true;
            }
            return;
        }

        if self.retarget.update(1.0) {
            self.pick_heading(ctx.view.player_pos);
        }
        if self.trigger.update(1.0) {
            self.fire(ctx);
        }
        self.velocity.update(&mut self.core.position);

        let signals = AnimSignals {
            speed: self.velocity.speed(),
            health_zero: self.health == 0,
            ..AnimSignals::default()
        };
        if let Err(err) = self.controller.update(&signals) {
            error!(%err, "saucer animation failed");
        }
    }

    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        let center = interpolated_center(
            self.core.position,
            Some(self.velocity.velocity),
            gfx.lerp,
            offset,
        );
        for tile in self.controller.frames(gfx.lerp) {
            gfx.draw_tile(tile, center, 0.0)?;
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

    fn kill(&mut self, ctx: &mut UpdateContext) {
        if self.core.dying {
            return;
        }
        self.core.dying = true;
        self.health = 0;
        self.velocity.velocity = Vec2::ZERO;
        self.core.play_sound("explode_big");
        let tags = ctx.tags;
        let mut rng = platform::rng();
        if rng.random_bool(POWERUP_CHANCE) {
            let kind = PowerupKind::random(&mut rng);
            match Powerup::new(ctx.data, self.core.position, kind) {
                Ok(pickup) => ctx.spawn_tagged(Box::new(pickup), &[tags.pickups]),
                Err(err) => error!(%err, "failed to spawn powerup"),
            }
        }
    }

    fn score_value(&self) -> u32 {
        200
    }

    fn draw_layer(&self) -> i32 {
        2
    }

    fn save_key(&self) -> Option<&'static str> {
        Some(Self::SAVE_KEY)
    }

    fn save_fields(&self) -> GameResult<Value> {
        Ok(json!({
            "position": [self.core.position.x, self.core.position.y],
            "velocity": [self.velocity.velocity.x, self.velocity.velocity.y],
            "health": self.health,
        }))
    }
}
