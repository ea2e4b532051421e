//! Game objects and the capabilities they compose.
//!
//! An entity is a struct owning an [`EntityCore`] plus whichever
//! capability values it needs: [`Velocity`] for motion, [`Body`] for
//! rotation and a sprite, [`Hitbox`] for border containment, [`Collider`]
//! for circle collision. Capabilities update in a fixed order inside each
//! entity's `update`: motion first, then rotation, then animation.
//! Collision resolution runs afterwards as a group pass, so it always
//! sees fully updated positions.
//!
//! Entities never remove themselves or spawn others directly; they set
//! flags on their core and queue spawns on the [`UpdateContext`], and the
//! owning group applies both at defined points in the tick.

pub mod asteroid;
pub mod bullet;
pub mod effect;
pub mod group;
pub mod physics;
pub mod powerup;
pub mod registry;
pub mod saucer;
pub mod ship;

use std::any::Any;

use glam::Vec2;
use serde_json::Value;
use smallvec::SmallVec;

use crate::asset::GameData;
use crate::entity::group::SubgroupId;
use crate::error::{EntityError, GameResult};
use crate::input::InputFrame;
use crate::math::{normalize_degrees, RectF};
use crate::render::DrawContext;
use crate::texture::sprite::AtlasTile;

/// A sound queued by an entity, attenuated by distance when drained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub name: &'static str,
    pub volume: f32,
}

/// State every entity carries.
#[derive(Debug, Clone, Default)]
pub struct EntityCore {
    pub position: Vec2,
    /// Sounds queued this tick, drained by the owning group.
    pub sounds: Vec<SoundEvent>,
    /// Set when the entity has begun dying (death animation playing).
    /// A dying entity no longer collides.
    pub dying: bool,
    /// Set when the entity should be swept from the group this tick.
    pub removed: bool,
}

impl EntityCore {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn play_sound(&mut self, name: &'static str) {
        self.sounds.push(SoundEvent { name, volume: 1.0 });
    }
}

/// Motion capability: velocity clamped to a top speed, integrated once
/// per tick.
#[derive(Debug, Clone)]
pub struct Velocity {
    pub velocity: Vec2,
    pub max_speed: f32,
}

impl Velocity {
    pub fn new(max_speed: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            max_speed,
        }
    }

    pub fn with_velocity(velocity: Vec2, max_speed: f32) -> Self {
        Self { velocity, max_speed }
    }

    /// Clamps the velocity to the top speed, then moves `position` by it.
    pub fn update(&mut self, position: &mut Vec2) {
        self.velocity = self.velocity.clamp_length_max(self.max_speed);
        *position += self.velocity;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Rotation capability, with an optional static sprite for entities that
/// do not run an animation controller.
#[derive(Debug, Clone)]
pub struct Body {
    /// Facing angle in degrees, counter-clockwise from +X.
    pub rotation: f32,
    /// Degrees turned per tick.
    pub angular_velocity: f32,
    /// Constant offset correcting for how the sprite art is oriented.
    pub extra_rotation: f32,
    pub tile: Option<AtlasTile>,
}

impl Body {
    pub fn new(rotation: f32, extra_rotation: f32) -> Self {
        Self {
            rotation,
            angular_velocity: 0.0,
            extra_rotation,
            tile: None,
        }
    }

    pub fn with_tile(mut self, tile: AtlasTile) -> Self {
        self.tile = Some(tile);
        self
    }

    pub fn update(&mut self) {
        self.rotation = normalize_degrees(self.rotation + self.angular_velocity);
    }
}

/// Axis-aligned bounds used for border containment and overlap checks.
#[derive(Debug, Clone, Copy)]
pub struct Hitbox {
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    pub fn rect(&self, position: Vec2) -> RectF {
        RectF::from_center_size(position, self.size)
    }
}

/// Circle collision capability.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub radius: f32,
    /// Velocity scale applied when bouncing off another collider.
    pub bounce: f32,
}

impl Collider {
    pub fn new(radius: f32, bounce: f32) -> Self {
        Self { radius, bounce }
    }
}

/// What the world looks like to an entity during its update.
#[derive(Debug, Clone, Copy)]
pub struct WorldView {
    /// Where the player ship is, if it is alive.
    pub player_pos: Option<Vec2>,
    /// The playfield borders.
    pub bounds: RectF,
    pub tick: u64,
}

/// The standard subgroups the play state creates. Entities receive these
/// so spawned siblings land in the right views.
#[derive(Debug, Clone, Copy)]
pub struct GroupTags {
    pub rocks: SubgroupId,
    pub bullets: SubgroupId,
    pub pickups: SubgroupId,
    pub effects: SubgroupId,
}

/// An entity waiting to be inserted into the group after the update pass.
pub struct PendingSpawn {
    pub object: Box<dyn GameObject>,
    pub tags: SmallVec<[SubgroupId; 2]>,
}

/// Everything an entity may touch while updating.
pub struct UpdateContext<'a> {
    pub input: &'a InputFrame,
    pub data: &'a GameData,
    pub view: WorldView,
    pub tags: GroupTags,
    pub spawns: Vec<PendingSpawn>,
}

impl UpdateContext<'_> {
    pub fn spawn(&mut self, object: Box<dyn GameObject>) {
        self.spawns.push(PendingSpawn {
            object,
            tags: SmallVec::new(),
        });
    }

    pub fn spawn_tagged(&mut self, object: Box<dyn GameObject>, tags: &[SubgroupId]) {
        self.spawns.push(PendingSpawn {
            object,
            tags: SmallVec::from_slice(tags),
        });
    }
}

/// A simulated object owned by an [`group::ObjectGroup`].
pub trait GameObject: Send + Sync {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Concrete-type access for game logic the trait does not cover,
    /// like granting a powerup to the ship.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Advances the entity by one simulation tick.
    fn update(&mut self, ctx: &mut UpdateContext);

    /// Draws the entity. `offset` translates world positions into canvas
    /// pixels (the camera).
    fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()>;

    fn velocity(&self) -> Option<&Velocity> {
        None
    }

    fn velocity_mut(&mut self) -> Option<&mut Velocity> {
        None
    }

    fn hitbox(&self) -> Option<&Hitbox> {
        None
    }

    fn collider(&self) -> Option<&Collider> {
        None
    }

    /// Applies damage. Entities with health override this.
    fn hit(&mut self, _damage: u32, _ctx: &mut UpdateContext) {}

    /// Begins dying. The default marks the entity dying immediately;
    /// entities with death animations override this and remove themselves
    /// once the animation finishes.
    fn kill(&mut self, _ctx: &mut UpdateContext) {
        self.core_mut().dying = true;
        self.core_mut().removed = true;
    }

    /// Removes the entity this tick, skipping any death sequence.
    fn force_kill(&mut self) {
        let core = self.core_mut();
        core.dying = true;
        core.removed = true;
    }

    /// Points awarded when the player destroys this entity.
    fn score_value(&self) -> u32 {
        0
    }

    /// Entities draw in ascending layer order.
    fn draw_layer(&self) -> i32 {
        0
    }

    /// The registry key used to respawn this entity from a save, or None
    /// for entities that are not persisted.
    fn save_key(&self) -> Option<&'static str> {
        None
    }

    /// The fields stored in a save record for this entity.
    fn save_fields(&self) -> GameResult<Value> {
        Err(EntityError::NotPersistable.into())
    }
}

/// Where to draw an entity between ticks.
///
/// The position is rewound by the part of the last integration step the
/// render clock has not caught up to yet, so motion appears continuous
/// even though the simulation moves in 50ms steps.
pub fn interpolated_center(position: Vec2, velocity: Option<Vec2>, lerp_amount: f32, offset: Vec2) -> Vec2 {
    match velocity {
        Some(velocity) => position - velocity * (1.0 - lerp_amount) + offset,
        None => position + offset,
    }
}

/// The angle (clockwise degrees, as the renderer wants) to draw an entity
/// at, rewinding angular velocity the same way positions are rewound.
pub fn draw_rotation(rotation: f32, angular_velocity: f32, lerp_amount: f32, extra_rotation: f32) -> f32 {
    -(rotation - angular_velocity * (1.0 - lerp_amount)) - extra_rotation
}
