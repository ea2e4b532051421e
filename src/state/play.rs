//! The playfield: waves of rocks, the saucer, scoring, and the HUD.

use glam::{UVec2, Vec2};
use rand::Rng;
use sdl2::pixels::Color;
use smallvec::SmallVec;
use thousands::Separable;
use tracing::{debug, error};

use crate::asset::{self, GameData};
use crate::constants::{CANVAS_SIZE, WORLD_SIZE};
use crate::entity::asteroid::{Asteroid, AsteroidSize};
use crate::entity::bullet::{Bullet, BulletSource};
use crate::entity::effect::Effect;
use crate::entity::group::{EntityId, ObjectGroup};
use crate::entity::powerup::{Powerup, PowerupKind};
use crate::entity::registry::EntityRegistry;
use crate::entity::saucer::Saucer;
use crate::entity::ship::Ship;
use crate::entity::{GroupTags, UpdateContext, WorldView};
use crate::error::GameResult;
use crate::input::Action;
use crate::math::RectF;
use crate::platform;
use crate::render::DrawContext;
use crate::save::{EntityRecord, SaveRecord, SaveStore};
use crate::state::gameover::GameOverState;
use crate::state::pause::PauseState;
use crate::state::{Below, State, StateContext, StateKind};
use crate::texture::sprite::AtlasTile;
use crate::texture::sprites::{GameSprite, StarSprite};

const STARTING_LIVES: u32 = 3;
const RESPAWN_DELAY_TICKS: u32 = 30;
/// Ticks between saucer visits, jittered per spawn.
const SAUCER_INTERVAL_TICKS: (u32, u32) = (500, 900);
/// A kill within this window of the previous one raises the multiplier.
const COMBO_WINDOW_TICKS: u32 = 30;
const COMBO_MAX: u32 = 5;
const WAVE_BANNER_TICKS: u32 = 40;
const STAR_COUNT: usize = 90;
/// The starfield scrolls at this fraction of camera speed.
const STAR_PARALLAX: f32 = 0.5;
const CAMERA_FOLLOW: f32 = 0.25;
/// Rocks never spawn closer than this to the ship.
const SAFE_SPAWN_RADIUS: f32 = 140.0;

pub struct PlayState {
    group: ObjectGroup,
    tags: GroupTags,
    ship_id: Option<EntityId>,
    saucer_id: Option<EntityId>,
    camera: Vec2,
    score: u64,
    lives: u32,
    wave: u32,
    combo: u32,
    combo_ticks: u32,
    saucer_ticks: u32,
    respawn_ticks: u32,
    wave_banner_ticks: u32,
    stars: Vec<(Vec2, AtlasTile)>,
    life_tile: AtlasTile,
    tick: u64,
    /// Set once the last ship is gone; suppresses run persistence.
    game_over: bool,
}

impl PlayState {
    /// Starts a fresh run: ship at the world center, first wave of rocks.
    pub fn new(data: &GameData) -> GameResult<Self> {
        let mut state = Self::empty()?;
        let center = WORLD_SIZE * 0.5;
        let ship = Ship::new(data, center)?;
        state.ship_id = Some(state.group.spawn(Box::new(ship)));
        state.camera = state.clamp_camera(center);
        state.begin_wave(data, 1)?;
        Ok(state)
    }

    /// Resumes a saved run by respawning every recorded entity through the
    /// registry.
    pub fn from_save(data: &GameData, registry: &EntityRegistry, record: &SaveRecord) -> GameResult<Self> {
        let mut state = Self::empty()?;
        state.score = record.score;
        state.camera = state.clamp_camera(Vec2::from_array(record.camera));
        state.wave = record
            .level
            .strip_prefix("wave_")
            .and_then(|n| n.parse().ok())
            .unwrap_or(1);
        for entity in &record.entities {
            let object = registry.spawn(data, &entity.key, &entity.fields)?;
            let tags: SmallVec<[_; 1]> = match entity.key.as_str() {
                Asteroid::SAVE_KEY => SmallVec::from_slice(&[state.tags.rocks]),
                Powerup::SAVE_KEY => SmallVec::from_slice(&[state.tags.pickups]),
                _ => SmallVec::new(),
            };
            let id = state.group.spawn_tagged(object, &tags);
            match entity.key.as_str() {
                Ship::SAVE_KEY => state.ship_id = Some(id),
                Saucer::SAVE_KEY => state.saucer_id = Some(id),
                _ => {}
            }
        }
        if state.ship_id.is_none() {
            state.respawn_ticks = RESPAWN_DELAY_TICKS;
        }
        // A save taken between waves resumes by starting the next one.
        if state.group.subgroup_len(state.tags.rocks) == 0 {
            let next = state.wave + 1;
            state.begin_wave(data, next)?;
        }
        debug!(wave = state.wave, score = state.score, "resumed saved run");
        Ok(state)
    }

    fn empty() -> GameResult<Self> {
        let mut group = ObjectGroup::new();
        let tags = GroupTags {
            rocks: group.create_subgroup(),
            bullets: group.create_subgroup(),
            pickups: group.create_subgroup(),
            effects: group.create_subgroup(),
        };
        Ok(Self {
            group,
            tags,
            ship_id: None,
            saucer_id: None,
            camera: WORLD_SIZE * 0.5,
            score: 0,
            lives: STARTING_LIVES,
            wave: 0,
            combo: 1,
            combo_ticks: 0,
            saucer_ticks: saucer_interval(),
            respawn_ticks: 0,
            wave_banner_ticks: 0,
            stars: make_stars()?,
            life_tile: asset::tile(&GameSprite::HudLife.to_path())?,
            tick: 0,
            game_over: false,
        })
    }

    /// Spawns the rocks for `wave` and shows its banner.
    fn begin_wave(&mut self, data: &GameData, wave: u32) -> GameResult<()> {
        self.wave = wave;
        self.wave_banner_ticks = WAVE_BANNER_TICKS;
        let count = (2 + wave).min(10);
        let avoid = self.player_pos().unwrap_or(WORLD_SIZE * 0.5);
        let mut rng = platform::rng();
        for _ in 0..count {
            let mut position = Vec2::ZERO;
            // A handful of tries is plenty on a field this large.
            for _ in 0..20 {
                position = Vec2::new(
                    rng.random_range(40.0..WORLD_SIZE.x - 40.0),
                    rng.random_range(40.0..WORLD_SIZE.y - 40.0),
                );
                if position.distance(avoid) >= SAFE_SPAWN_RADIUS {
                    break;
                }
            }
            let rock = Asteroid::drifting(data, position, AsteroidSize::Large)?;
            self.group.spawn_tagged(Box::new(rock), &[self.tags.rocks]);
        }
        debug!(wave, rocks = count, "wave started");
        Ok(())
    }

    fn player_pos(&self) -> Option<Vec2> {
        let id = self.ship_id?;
        let object = self.group.get(id)?;
        if object.core().dying {
            return None;
        }
        Some(object.core().position)
    }

    fn world_view(&self) -> WorldView {
        WorldView {
            player_pos: self.player_pos(),
            bounds: RectF::new(Vec2::ZERO, WORLD_SIZE),
            tick: self.tick,
        }
    }

    /// Walks this tick's bullets and lands each on the first target whose
    /// hitbox it overlaps. Player bullets hit rocks and the saucer; saucer
    /// bullets hit the ship.
    fn resolve_hits(&mut self, world: &mut UpdateContext) {
        let bullet_ids: SmallVec<[EntityId; 16]> =
            SmallVec::from_slice(self.group.subgroup_ids(self.tags.bullets));
        for bullet_id in bullet_ids {
            let Some((source, damage, rect, position)) = self.bullet_probe(bullet_id) else {
                continue;
            };
            let target = match source {
                BulletSource::Player => self.find_hostile_hit(&rect),
                BulletSource::Saucer => self.find_ship_hit(&rect),
            };
            let Some(target_id) = target else {
                continue;
            };
            if let Some(object) = self.group.get_mut(target_id) {
                object.hit(damage, world);
                let destroyed = object.core().dying;
                let value = object.score_value();
                if destroyed && source == BulletSource::Player {
                    self.award(u64::from(value));
                }
            }
            if let Some(bullet) = self.group.get_mut(bullet_id) {
                bullet.force_kill();
            }
            match Effect::spark(world.data, position) {
                Ok(spark) => world.spawn_tagged(Box::new(spark), &[self.tags.effects]),
                Err(err) => error!(%err, "failed to spawn spark"),
            }
        }
    }

    fn bullet_probe(&self, id: EntityId) -> Option<(BulletSource, u32, RectF, Vec2)> {
        let object = self.group.get(id)?;
        if object.core().dying {
            return None;
        }
        let bullet = object.as_any().downcast_ref::<Bullet>()?;
        let position = object.core().position;
        let rect = object.hitbox()?.rect(position);
        Some((bullet.source(), bullet.damage(), rect, position))
    }

    /// The first live rock or the saucer overlapping `rect`, in id order.
    fn find_hostile_hit(&self, rect: &RectF) -> Option<EntityId> {
        for &id in self.group.subgroup_ids(self.tags.rocks) {
            if self.overlaps(id, rect) {
                return Some(id);
            }
        }
        self.saucer_id.filter(|&id| self.overlaps(id, rect))
    }

    fn find_ship_hit(&self, rect: &RectF) -> Option<EntityId> {
        self.ship_id.filter(|&id| self.overlaps(id, rect))
    }

    fn overlaps(&self, id: EntityId, rect: &RectF) -> bool {
        let Some(object) = self.group.get(id) else {
            return false;
        };
        if object.core().dying {
            return false;
        }
        let Some(hitbox) = object.hitbox() else {
            return false;
        };
        hitbox.rect(object.core().position).intersects(rect)
    }

    /// Damages the ship once for any hostile it bounced off this tick.
    fn resolve_ship_contacts(&mut self, world: &mut UpdateContext) {
        let Some(ship_id) = self.ship_id else {
            return;
        };
        let mut rammed = false;
        for &(first, second) in self.group.collisions() {
            let other = if first == ship_id {
                second
            } else if second == ship_id {
                first
            } else {
                continue;
            };
            if self.group.in_subgroup(self.tags.rocks, other) || self.saucer_id == Some(other) {
                rammed = true;
                break;
            }
        }
        if rammed {
            if let Some(ship) = self.group.get_mut(ship_id) {
                ship.hit(1, world);
            }
        }
    }

    /// Hands the ship any powerup it flew over.
    fn collect_pickups(&mut self) {
        let Some(ship_id) = self.ship_id else {
            return;
        };
        let Some(ship_rect) = self
            .group
            .get(ship_id)
            .filter(|ship| !ship.core().dying)
            .and_then(|ship| Some(ship.hitbox()?.rect(ship.core().position)))
        else {
            return;
        };
        let pickup_ids: SmallVec<[EntityId; 8]> =
            SmallVec::from_slice(self.group.subgroup_ids(self.tags.pickups));
        for pickup_id in pickup_ids {
            if !self.overlaps(pickup_id, &ship_rect) {
                continue;
            }
            let Some(kind) = self
                .group
                .get(pickup_id)
                .and_then(|object| object.as_any().downcast_ref::<Powerup>())
                .map(Powerup::kind)
            else {
                continue;
            };
            if kind == PowerupKind::ExtraLife {
                self.lives += 1;
            }
            if let Some(ship) = self
                .group
                .get_mut(ship_id)
                .and_then(|object| object.as_any_mut().downcast_mut::<Ship>())
            {
                ship.grant(kind);
            }
            if let Some(pickup) = self.group.get_mut(pickup_id) {
                pickup.force_kill();
            }
        }
    }

    fn award(&mut self, value: u64) {
        if self.combo_ticks > 0 {
            self.combo = (self.combo + 1).min(COMBO_MAX);
        } else {
            self.combo = 1;
        }
        self.combo_ticks = COMBO_WINDOW_TICKS;
        self.score += value * u64::from(self.combo);
    }

    /// Per-tick bookkeeping after the entity passes: respawns, wave
    /// advancement, the saucer clock, the combo window, and the camera.
    fn housekeeping(&mut self, ctx: &mut StateContext) {
        self.tick += 1;
        self.wave_banner_ticks = self.wave_banner_ticks.saturating_sub(1);

        if self.combo_ticks > 0 {
            self.combo_ticks -= 1;
            if self.combo_ticks == 0 {
                self.combo = 1;
            }
        }

        if let Some(ship_id) = self.ship_id {
            if !self.group.contains(ship_id) {
                self.ship_id = None;
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    self.game_over = true;
                    if let Err(err) = ctx.saves.clear_run() {
                        error!(%err, "failed to clear finished run");
                    }
                    ctx.push_state(Box::new(GameOverState::new(self.score, self.wave)));
                } else {
                    self.respawn_ticks = RESPAWN_DELAY_TICKS;
                }
            }
        } else if self.respawn_ticks > 0 && !self.game_over {
            self.respawn_ticks -= 1;
            if self.respawn_ticks == 0 {
                match Ship::new(ctx.data, WORLD_SIZE * 0.5) {
                    Ok(ship) => self.ship_id = Some(self.group.spawn(Box::new(ship))),
                    Err(err) => error!(%err, "failed to respawn ship"),
                }
            }
        }

        if let Some(saucer_id) = self.saucer_id {
            if !self.group.contains(saucer_id) {
                self.saucer_id = None;
                self.saucer_ticks = saucer_interval();
            }
        } else if !self.game_over {
            self.saucer_ticks = self.saucer_ticks.saturating_sub(1);
            if self.saucer_ticks == 0 {
                self.spawn_saucer(ctx.data);
                self.saucer_ticks = saucer_interval();
            }
        }

        if self.group.subgroup_len(self.tags.rocks) == 0 && !self.game_over {
            let next = self.wave + 1;
            if let Err(err) = self.begin_wave(ctx.data, next) {
                error!(%err, "failed to start wave");
            } else {
                ctx.play_sound("wave", 1.0);
            }
        }

        if let Some(target) = self.player_pos() {
            let followed = self.camera + (target - self.camera) * CAMERA_FOLLOW;
            self.camera = self.clamp_camera(followed);
        }
    }

    /// Brings the saucer in from a side edge at the ship's rough height.
    fn spawn_saucer(&mut self, data: &GameData) {
        let mut rng = platform::rng();
        let x = if rng.random_bool(0.5) { 20.0 } else { WORLD_SIZE.x - 20.0 };
        let y = rng.random_range(WORLD_SIZE.y * 0.2..WORLD_SIZE.y * 0.8);
        match Saucer::new(data, Vec2::new(x, y)) {
            Ok(saucer) => {
                self.saucer_id = Some(self.group.spawn(Box::new(saucer)));
                debug!("saucer arrived");
            }
            Err(err) => error!(%err, "failed to spawn saucer"),
        }
    }

    /// Keeps the camera from showing past the playfield borders.
    fn clamp_camera(&self, camera: Vec2) -> Vec2 {
        let half = CANVAS_SIZE.as_vec2() * 0.5;
        camera.clamp(half, WORLD_SIZE - half)
    }

    fn draw_hud(&self, gfx: &mut DrawContext) -> GameResult<()> {
        gfx.draw_text(&self.score.separate_with_commas(), UVec2::new(4, 4))?;
        if self.combo > 1 {
            gfx.draw_text_colored(&format!("X{}", self.combo), UVec2::new(4, 14), Color::YELLOW)?;
        }
        for index in 0..self.lives {
            let center = Vec2::new(
                CANVAS_SIZE.x as f32 - 10.0 - index as f32 * 12.0,
                9.0,
            );
            gfx.draw_tile(self.life_tile, center, 0.0)?;
        }
        if self.wave_banner_ticks > 0 {
            gfx.draw_text_centered(&format!("WAVE {}", self.wave), CANVAS_SIZE.y / 2 - 20, Color::WHITE)?;
        }
        Ok(())
    }
}

impl State for PlayState {
    fn kind(&self) -> StateKind {
        StateKind::Play
    }

    fn userinput(&mut self, ctx: &mut StateContext) {
        if self.game_over {
            return;
        }
        if ctx.input.tapped(Action::Pause) {
            ctx.play_sound("ui_select", 1.0);
            ctx.push_state(Box::new(PauseState::new()));
        }
    }

    fn update(&mut self, ctx: &mut StateContext) {
        let view = self.world_view();
        let mut world = UpdateContext {
            input: ctx.input,
            data: ctx.data,
            view,
            tags: self.tags,
            spawns: Vec::new(),
        };
        self.group.update(&mut world);
        self.resolve_hits(&mut world);
        self.resolve_ship_contacts(&mut world);
        self.collect_pickups();
        self.group.absorb_spawns(&mut world);
        self.group.collect_sounds(self.player_pos());
        self.group.sweep();
        self.housekeeping(ctx);
        ctx.sounds.extend(self.group.take_sounds());
    }

    fn draw(&self, gfx: &mut DrawContext, _below: Below) -> GameResult<()> {
        let offset = CANVAS_SIZE.as_vec2() * 0.5 - self.camera;
        let star_offset = offset * STAR_PARALLAX;
        for &(position, tile) in &self.stars {
            gfx.draw_tile(tile, position + star_offset, 0.0)?;
        }
        self.group.draw(gfx, offset)?;
        self.draw_hud(gfx)
    }

    /// Persists the run unless it ended; pausing out to the menu keeps it
    /// resumable.
    fn quit(&mut self, saves: &SaveStore) -> GameResult<()> {
        if self.game_over {
            return Ok(());
        }
        let mut entities = Vec::new();
        for (_, object) in self.group.iter() {
            let Some(key) = object.save_key() else {
                continue;
            };
            if object.core().dying {
                continue;
            }
            entities.push(EntityRecord {
                key: key.to_string(),
                fields: object.save_fields()?,
            });
        }
        let record = SaveRecord {
            level: format!("wave_{}", self.wave),
            score: self.score,
            camera: self.camera.to_array(),
            entities,
        };
        saves.save_run(&record)?;
        debug!(wave = self.wave, score = self.score, "run saved");
        Ok(())
    }
}

fn saucer_interval() -> u32 {
    platform::rng().random_range(SAUCER_INTERVAL_TICKS.0..=SAUCER_INTERVAL_TICKS.1)
}

/// Scatters the parallax starfield over the area it can ever show.
fn make_stars() -> GameResult<Vec<(Vec2, AtlasTile)>> {
    let dim = asset::tile(&GameSprite::Star(StarSprite::Dim).to_path())?;
    let bright = asset::tile(&GameSprite::Star(StarSprite::Bright).to_path())?;
    let span = (WORLD_SIZE - CANVAS_SIZE.as_vec2()) * STAR_PARALLAX + CANVAS_SIZE.as_vec2();
    let mut rng = platform::rng();
    let mut stars = Vec::with_capacity(STAR_COUNT);
    for _ in 0..STAR_COUNT {
        let position = Vec2::new(rng.random_range(0.0..span.x), rng.random_range(0.0..span.y));
        let tile = if rng.random_bool(0.25) { bright } else { dim };
        stars.push((position, tile));
    }
    Ok(stars)
}
