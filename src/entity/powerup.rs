//! Pickups dropped by destroyed rocks.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::asset::GameData;
use crate::entity::{interpolated_center, EntityCore, GameObject, Hitbox, UpdateContext, Velocity};
use crate::error::{EntityError, GameResult};
use crate::math::from_polar;
use crate::platform;
use crate::render::DrawContext;
use crate::texture::animation::Animation;

/// Ticks a pickup floats before despawning.
const DESPAWN_TICKS: u32 = 300;
/// Near the end of its life a pickup blinks as a warning.
const BLINK_TICKS: u32 = 60;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    RapidFire,
    Shield,
    ExtraLife,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::RapidFire,
        PowerupKind::Shield,
        PowerupKind::ExtraLife,
    ];

    /// Looks a kind up by its data-file name.
    pub fn parse(name: &str) -> GameResult<Self> {
        name.parse()
            .map_err(|_| EntityError::UnknownPowerup(name.to_string()).into())
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL
            .choose(rng)
            .copied()
            .unwrap_or(PowerupKind::RapidFire)
    }

    /// How long the granted effect lasts, in ticks. Zero means the effect
    /// applies instantly (an extra life).
    pub fn duration_ticks(self) -> u32 {
        match self {
            PowerupKind::RapidFire => 200,
            PowerupKind::Shield => 400,
            PowerupKind::ExtraLife => 0,
        }
    }

    fn clip_name(self) -> &'static str {
        match self {
            PowerupKind::RapidFire => "powerup/rapid",
            PowerupKind::Shield => "powerup/shield",
            PowerupKind::ExtraLife => "powerup/life",
        }
    }
}

pub struct Powerup {
    core: EntityCore,
    velocity: Velocity,
    hitbox: Hitbox,
    clip: Animation,
    kind: PowerupKind,
    despawn_ticks: u32,
}

#[derive(Deserialize)]
struct SavedPowerup {
    position: [f32; 2],
    velocity: [f32; 2],
    kind: PowerupKind,
    despawn_ticks: u32,
}

impl Powerup {
    pub const SAVE_KEY: &'static str = "powerup";

    pub fn new(data: &GameData, position: Vec2, kind: PowerupKind) -> GameResult<Self> {
        let mut rng = platform::rng();
        let drift = from_polar(rng.random_range(0.0..360.0), 0.3);
        Ok(Self {
            core: EntityCore::new(position),
            velocity: Velocity::with_velocity(drift, 0.5),
            hitbox: Hitbox::new(Vec2::splat(12.0)),
            clip: data.clip(kind.clip_name())?,
            kind,
            despawn_ticks: DESPAWN_TICKS,
        })
    }

    pub fn from_save(data: &GameData, fields: &Value) -> GameResult<Box<dyn GameObject>> {
        let saved: SavedPowerup =
            serde_json::from_value(fields.clone()).map_err(|err| EntityError::BadRecord {
                key: Self::SAVE_KEY.to_string(),
                reason: err.to_string(),
            })?;
        let mut pickup = Self::new(data, Vec2::from(saved.position), saved.kind)?;
        pickup.velocity.velocity = Vec2::from(saved.velocity);
        pickup.despawn_ticks = saved.despawn_ticks.clamp(1, DESPAWN_TICKS);
        Ok(Box::new(pickup))
    }

    pub fn kind(&self) -> PowerupKind {
        self.kind
    }
}

impl GameObject for Powerup {
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
        self.clip.update();
        self.despawn_ticks = self.despawn_ticks.saturating_sub(1);
        if self.despawn_ticks == 0 {
            self.force_kill();
        }
    }

    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        let blinked_off = self.despawn_ticks < BLINK_TICKS && (self.despawn_ticks / 4) % 2 == 1;
        if blinked_off {
            return Ok(());
        }
        let center = interpolated_center(
            self.core.position,
            Some(self.velocity.velocity),
            gfx.lerp,
            offset,
        );
        if let Some(tile) = self.clip.frame(gfx.lerp) {
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

    fn draw_layer(&self) -> i32 {
        1
    }

    fn save_key(&self) -> Option<&'static str> {
        Some(Self::SAVE_KEY)
    }

    fn save_fields(&self) -> GameResult<Value> {
        Ok(json!({
            "position": [self.core.position.x, self.core.position.y],
            "velocity": [self.velocity.velocity.x, self.velocity.velocity.y],
            "kind": self.kind,
            "despawn_ticks": self.despawn_ticks,
        }))
    }
}
