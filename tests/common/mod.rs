#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::{env, fs, process};

use glam::Vec2;

use driftbelt::asset::GameData;
use driftbelt::constants::WORLD_SIZE;
use driftbelt::entity::group::ObjectGroup;
use driftbelt::entity::{
    Collider, EntityCore, GameObject, GroupTags, Hitbox, UpdateContext, Velocity, WorldView,
};
use driftbelt::error::GameResult;
use driftbelt::math::RectF;
use driftbelt::render::DrawContext;
use driftbelt::save::SaveStore;

/// The parsed game data, shared across tests. Loading validates every
/// cross-reference in the embedded files, so doing it once is enough.
pub fn game_data() -> &'static GameData {
    static DATA: OnceLock<GameData> = OnceLock::new();
    DATA.get_or_init(|| GameData::load().expect("embedded game data must parse"))
}

/// A world view over the full playfield with no player.
pub fn world_view() -> WorldView {
    WorldView {
        player_pos: None,
        bounds: RectF::new(Vec2::ZERO, WORLD_SIZE),
        tick: 0,
    }
}

/// Creates the four standard subgroups on a fresh group, in the order the
/// play state creates them.
pub fn standard_tags(group: &mut ObjectGroup) -> GroupTags {
    GroupTags {
        rocks: group.create_subgroup(),
        bullets: group.create_subgroup(),
        pickups: group.create_subgroup(),
        effects: group.create_subgroup(),
    }
}

/// A bare object for exercising group passes: a circle with optional
/// velocity, hitbox, and collider, and no sprite of its own.
pub struct Orb {
    core: EntityCore,
    velocity: Option<Velocity>,
    hitbox: Option<Hitbox>,
    collider: Option<Collider>,
}

impl Orb {
    pub fn new(position: Vec2) -> Self {
        Self {
            core: EntityCore::new(position),
            velocity: None,
            hitbox: None,
            collider: None,
        }
    }

    pub fn moving(position: Vec2, velocity: Vec2) -> Self {
        Self::new(position).with_velocity(velocity)
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(Velocity::with_velocity(velocity, 100.0));
        self
    }

    pub fn with_collider(mut self, radius: f32) -> Self {
        self.collider = Some(Collider::new(radius, 1.0));
        self
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        let radius = self.collider.map_or(1.0, |collider| collider.radius);
        self.collider = Some(Collider::new(radius, bounce));
        self
    }

    pub fn with_hitbox(mut self, size: Vec2) -> Self {
        self.hitbox = Some(Hitbox::new(size));
        self
    }
}

impl GameObject for Orb {
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
        if let Some(velocity) = &mut self.velocity {
            velocity.update(&mut self.core.position);
        }
    }

    fn draw(&self, _gfx: &mut DrawContext, _offset: Vec2) -> GameResult<()> {
        Ok(())
    }

    fn velocity(&self) -> Option<&Velocity> {
        self.velocity.as_ref()
    }

    fn velocity_mut(&mut self) -> Option<&mut Velocity> {
        self.velocity.as_mut()
    }

    fn hitbox(&self) -> Option<&Hitbox> {
        self.hitbox.as_ref()
    }

    fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }
}

/// A save store rooted in a fresh temp directory, removed on drop.
pub struct TempSaves {
    pub store: SaveStore,
    dir: PathBuf,
}

impl TempSaves {
    pub fn new(label: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("driftbelt_test_{}_{}_{}", label, process::id(), unique));
        fs::create_dir_all(&dir).expect("temp save dir");
        Self {
            store: SaveStore::at(&dir),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TempSaves {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
