//! The player's ship.
//!
//! Thrust accelerates along the facing angle, turning is instant, and a
//! mild drag bleeds speed off while coasting. Death plays the break-up
//! timeline before the ship leaves the group; the play state watches for
//! that removal to spend a life.

use bitflags::bitflags;
use glam::Vec2;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::asset::GameData;
use crate::entity::bullet::{Bullet, BulletSource};
use crate::entity::powerup::PowerupKind;
use crate::entity::{
    draw_rotation, interpolated_center, Body, Collider, EntityCore, GameObject, Hitbox,
    SoundEvent, UpdateContext, Velocity,
};
use crate::error::{EntityError, GameResult};
use crate::input::Action;
use crate::math::from_polar;
use crate::render::DrawContext;
use crate::texture::animation::{AnimController, AnimSignals, Animation};
use crate::timing::Timer;

const TURN_RATE: f32 = 9.0;
const THRUST: f32 = 0.55;
const MAX_SPEED: f32 = 6.0;
/// Coasting velocity keep per tick.
const DRAG: f32 = 0.985;
const FIRE_COOLDOWN: u32 = 6;
const RAPID_COOLDOWN: u32 = 2;
const MUZZLE_OFFSET: f32 = 10.0;
const SPAWN_INVULNERABLE_TICKS: u32 = 40;
const HIT_INVULNERABLE_TICKS: u32 = 20;
const THRUST_SOUND_INTERVAL: f32 = 6.0;
/// The shield blinks as a warning once this few ticks remain.
const SHIELD_BLINK_TICKS: u32 = 80;

bitflags! {
    /// Timed buffs currently applied to the ship.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShipEffects: u8 {
        const RAPID_FIRE = 1 << 0;
        const SHIELD = 1 << 1;
    }
}

pub struct Ship {
    core: EntityCore,
    velocity: Velocity,
    body: Body,
    hitbox: Hitbox,
    collider: Collider,
    controller: AnimController,
    shield_clip: Animation,
    effects: ShipEffects,
    rapid_ticks: u32,
    shield_ticks: u32,
    fire_cooldown: u32,
    invulnerable_ticks: u32,
    thrust_sound: Timer,
    thrusting: bool,
    dead: bool,
}

#[derive(Deserialize)]
struct SavedShip {
    position: [f32; 2],
    velocity: [f32; 2],
    rotation: f32,
    rapid_ticks: u32,
    shield_ticks: u32,
}

impl Ship {
    pub const SAVE_KEY: &'static str = "ship";

    pub fn new(data: &GameData, position: Vec2) -> GameResult<Self> {
        // The hull art points up, so the sprite needs no rotation when the
        // ship faces 90 degrees.
        let mut body = Body::new(90.0, -90.0);
        body.angular_velocity = 0.0;
        Ok(Self {
            core: EntityCore::new(position),
            velocity: Velocity::new(MAX_SPEED),
            body,
            hitbox: Hitbox::new(Vec2::splat(12.0)),
            collider: Collider::new(6.0, 0.5),
            controller: data.controller("ship")?,
            shield_clip: data.clip("ship/shield")?,
            effects: ShipEffects::empty(),
            rapid_ticks: 0,
            shield_ticks: 0,
            fire_cooldown: 0,
            invulnerable_ticks: SPAWN_INVULNERABLE_TICKS,
            thrust_sound: Timer::looping(THRUST_SOUND_INTERVAL),
            thrusting: false,
            dead: false,
        })
    }

    pub fn from_save(data: &GameData, fields: &Value) -> GameResult<Box<dyn GameObject>> {
        let saved: SavedShip =
            serde_json::from_value(fields.clone()).map_err(|err| EntityError::BadRecord {
                key: Self::SAVE_KEY.to_string(),
                reason: err.to_string(),
            })?;
        let mut ship = Self::new(data, Vec2::from(saved.position))?;
        ship.velocity.velocity = Vec2::from(saved.velocity);
        ship.body.rotation = saved.rotation;
        ship.rapid_ticks = saved.rapid_ticks;
        ship.shield_ticks = saved.shield_ticks;
        if ship.rapid_ticks > 0 {
            ship.effects.insert(ShipEffects::RAPID_FIRE);
        }
        if ship.shield_ticks > 0 {
            ship.effects.insert(ShipEffects::SHIELD);
        }
        Ok(Box::new(ship))
    }

    pub fn effects(&self) -> ShipEffects {
        self.effects
    }

    pub fn rotation(&self) -> f32 {
        self.body.rotation
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Applies a picked-up powerup. Extra lives are the play state's
    /// business and leave the ship untouched.
    pub fn grant(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::RapidFire => {
                self.effects.insert(ShipEffects::RAPID_FIRE);
                self.rapid_ticks = kind.duration_ticks();
            }
            PowerupKind::Shield => {
                self.effects.insert(ShipEffects::SHIELD);
                self.shield_ticks = kind.duration_ticks();
            }
            PowerupKind::ExtraLife => {}
        }
        self.core.play_sound("pickup");
    }

    fn fire(&mut self, ctx: &mut UpdateContext) {
        let tags = ctx.tags;
        let rapid = self.effects.contains(ShipEffects::RAPID_FIRE);
        let muzzle = self.core.position + from_polar(self.body.rotation, MUZZLE_OFFSET);
        match Bullet::new(muzzle, self.body.rotation, BulletSource::Player) {
            Ok(bullet) => {
                ctx.spawn_tagged(Box::new(bullet), &[tags.bullets]);
                self.core.play_sound("laser");
                self.fire_cooldown = if rapid { RAPID_COOLDOWN } else { FIRE_COOLDOWN };
            }
            Err(err) => error!(%err, "failed to spawn bullet"),
        }
    }

    fn decay_effects(&mut self) {
        if self.rapid_ticks > 0 {
            self.rapid_ticks -= 1;
            if self.rapid_ticks == 0 {
                self.effects.remove(ShipEffects::RAPID_FIRE);
            }
        }
        if self.shield_ticks > 0 {
            self.shield_ticks -= 1;
            if self.shield_ticks == 0 {
                self.effects.remove(ShipEffects::SHIELD);
            }
        }
        if self.invulnerable_ticks > 0 {
            self.invulnerable_ticks -= 1;
        }
    }
}

impl GameObject for Ship {
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
        if self.dead {
            let signals = AnimSignals {
                health_zero: true,
                ..AnimSignals::default()
            };
            if let Err(err) = self.controller.update(&signals) {
                error!(%err, "ship animation failed");
            }
            if self.controller.animations_complete() {
                self.core.removed = true;
            }
            return;
        }

        let input = ctx.input;
        self.body.angular_velocity = if input.held(Action::Left) {
            TURN_RATE
        } else if input.held(Action::Right) {
            -TURN_RATE
        } else {
            0.0
        };

        let was_thrusting = self.thrusting;
        self.thrusting = input.held(Action::Up);
        if self.thrusting {
            self.velocity.velocity += from_polar(self.body.rotation, THRUST);
            if !was_thrusting {
                self.thrust_sound.restart();
                self.core.sounds.push(SoundEvent {
                    name: "thrust",
                    volume: 0.5,
                });
            } else if self.thrust_sound.update(1.0) {
                self.core.sounds.push(SoundEvent {
                    name: "thrust",
                    volume: 0.5,
                });
            }
        } else {
            self.velocity.velocity *= DRAG;
        }

        self.velocity.update(&mut self.core.position);
        self.body.update();

        if self.fire_cooldown > 0 {
            self.fire_cooldown -= 1;
        }
        let rapid = self.effects.contains(ShipEffects::RAPID_FIRE);
        let wants_fire = input.tapped(Action::Fire) || (rapid && input.held(Action::Fire));
        if wants_fire && self.fire_cooldown == 0 {
            self.fire(ctx);
        }

        self.decay_effects();

        let signals = AnimSignals {
            speed: self.velocity.speed(),
            thrusting: self.thrusting,
            ..AnimSignals::default()
        };
        if let Err(err) = self.controller.update(&signals) {
            error!(%err, "ship animation failed");
        }
        self.shield_clip.update();
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
        let blinked_off =
            !self.dead && self.invulnerable_ticks > 0 && (self.invulnerable_ticks / 2) % 2 == 1;
        if !blinked_off {
            for tile in self.controller.frames(gfx.lerp) {
                gfx.draw_tile(tile, center, angle as f64)?;
            }
        }
        if self.effects.contains(ShipEffects::SHIELD) {
            let visible = self.shield_ticks > SHIELD_BLINK_TICKS || (self.shield_ticks / 4) % 2 == 0;
            if visible {
                if let Some(tile) = self.shield_clip.frame(gfx.lerp) {
                    gfx.draw_tile(tile, center, 0.0)?;
                }
            }
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

    fn hit(&mut self, _damage: u32, ctx: &mut UpdateContext) {
        if self.dead || self.invulnerable_ticks > 0 {
            return;
        }
        if self.effects.contains(ShipEffects::SHIELD) {
            self.effects.remove(ShipEffects::SHIELD);
            self.shield_ticks = 0;
            self.invulnerable_ticks = HIT_INVULNERABLE_TICKS;
            self.core.play_sound("ship_hit");
            return;
        }
        self.kill(ctx);
    }

    fn kill(&mut self, _ctx: &mut UpdateContext) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.core.dying = true;
        self.velocity.velocity = Vec2::ZERO;
        self.body.angular_velocity = 0.0;
        self.thrusting = false;
        self.effects = ShipEffects::empty();
        self.core.play_sound("explode_big");
    }

    fn draw_layer(&self) -> i32 {
        3
    }

    fn save_key(&self) -> Option<&'static str> {
        Some(Self::SAVE_KEY)
    }

    fn save_fields(&self) -> GameResult<Value> {
        Ok(json!({
            "position": [self.core.position.x, self.core.position.y],
            "velocity": [self.velocity.velocity.x, self.velocity.velocity.y],
            "rotation": self.body.rotation,
            "rapid_ticks": self.rapid_ticks,
            "shield_ticks": self.shield_ticks,
        }))
    }
}
