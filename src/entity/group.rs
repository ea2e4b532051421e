//! Entity ownership and the per-tick group passes.
//!
//! The group owns every live object, hands out stable ids, and mirrors
//! membership into subgroups. A tick runs in fixed phases: entity
//! updates, circle collision resolution, border containment, deferred
//! spawns, sound collection, and finally the removal sweep.

use glam::Vec2;
use smallvec::SmallVec;
use tracing::trace;

use crate::audio::SoundRequest;
use crate::constants::FULL_VOLUME_RADIUS;
use crate::entity::physics::{collides, resolve_border_collision, resolve_collision, Impact};
use crate::entity::{Collider, GameObject, UpdateContext};
use crate::error::GameResult;
use crate::render::DrawContext;

/// Stable handle to a group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

/// Handle to a membership view created by [`ObjectGroup::create_subgroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgroupId(usize);

struct Member {
    id: EntityId,
    object: Box<dyn GameObject>,
}

/// Owns a set of entities plus subgroup views over them.
///
/// Subgroups mirror a subset of the parent's membership: spawning with a
/// tag inserts into both, removing from the parent strips the id from
/// every subgroup, and removing from a subgroup leaves the parent alone.
pub struct ObjectGroup {
    next_id: u32,
    /// Always sorted by id; spawns append and the sweep preserves order.
    members: Vec<Member>,
    subgroups: Vec<Vec<EntityId>>,
    /// Sounds inside this radius of the listener play at full volume and
    /// fall off linearly with distance beyond it.
    full_volume_radius: f32,
    pending_sounds: Vec<SoundRequest>,
    /// Pairs resolved during the last update, for game logic that reacts
    /// to contacts (the first id is the entity whose scan found the pair).
    collisions: Vec<(EntityId, EntityId)>,
}

impl ObjectGroup {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            members: Vec::new(),
            subgroups: Vec::new(),
            full_volume_radius: FULL_VOLUME_RADIUS,
            pending_sounds: Vec::new(),
            collisions: Vec::new(),
        }
    }

    pub fn create_subgroup(&mut self) -> SubgroupId {
        self.subgroups.push(Vec::new());
        SubgroupId(self.subgroups.len() - 1)
    }

    pub fn spawn(&mut self, object: Box<dyn GameObject>) -> EntityId {
        self.spawn_tagged(object, &[])
    }

    pub fn spawn_tagged(&mut self, object: Box<dyn GameObject>, tags: &[SubgroupId]) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.members.push(Member { id, object });
        for tag in tags {
            self.subgroups[tag.0].push(id);
        }
        trace!(id = id.0, tags = tags.len(), "spawned entity");
        id
    }

    /// Mirrors an existing member into a subgroup.
    pub fn add_to_subgroup(&mut self, subgroup: SubgroupId, id: EntityId) {
        assert!(self.contains(id), "entity must be in the group before tagging");
        let ids = &mut self.subgroups[subgroup.0];
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Removes an entity from the group and from every subgroup.
    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn GameObject>> {
        let index = self.index_of(id)?;
        let member = self.members.remove(index);
        for subgroup in &mut self.subgroups {
            subgroup.retain(|&other| other != id);
        }
        Some(member.object)
    }

    /// Removes an entity from one subgroup only; the parent keeps it.
    pub fn remove_from_subgroup(&mut self, subgroup: SubgroupId, id: EntityId) {
        self.subgroups[subgroup.0].retain(|&other| other != id);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn in_subgroup(&self, subgroup: SubgroupId, id: EntityId) -> bool {
        self.subgroups[subgroup.0].contains(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn GameObject> {
        let index = self.index_of(id)?;
        Some(self.members[index].object.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut dyn GameObject> {
        let index = self.index_of(id)?;
        Some(self.members[index].object.as_mut())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn subgroup_len(&self, subgroup: SubgroupId) -> usize {
        self.subgroups[subgroup.0].len()
    }

    pub fn subgroup_ids(&self, subgroup: SubgroupId) -> &[EntityId] {
        &self.subgroups[subgroup.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &dyn GameObject)> + '_ {
        self.members
            .iter()
            .map(|member| (member.id, member.object.as_ref()))
    }

    pub fn iter_subgroup(&self, subgroup: SubgroupId) -> impl Iterator<Item = (EntityId, &dyn GameObject)> + '_ {
        self.subgroups[subgroup.0]
            .iter()
            .filter_map(move |&id| self.get(id).map(|object| (id, object)))
    }

    /// Runs one simulation tick over every member.
    pub fn update(&mut self, ctx: &mut UpdateContext) {
        self.collisions.clear();
        for index in 0..self.members.len() {
            self.members[index].object.update(ctx);
        }
        self.resolve_collisions();
        self.resolve_borders(ctx);
        self.absorb_spawns(ctx);
        self.collect_sounds(ctx.view.player_pos);
        self.sweep();
    }

    /// Moves entities queued on the context into the group.
    pub fn absorb_spawns(&mut self, ctx: &mut UpdateContext) {
        for pending in ctx.spawns.drain(..) {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            self.members.push(Member {
                id,
                object: pending.object,
            });
            for tag in &pending.tags {
                self.subgroups[tag.0].push(id);
            }
        }
    }

    /// Drains every entity's sound queue, attenuated by distance from the
    /// listener, into the group's pending queue.
    pub fn collect_sounds(&mut self, listener: Option<Vec2>) {
        let radius = self.full_volume_radius;
        for member in &mut self.members {
            let position = member.object.core().position;
            for sound in member.object.core_mut().sounds.drain(..) {
                let volume = sound.volume * attenuation(listener, position, radius);
                self.pending_sounds.push(SoundRequest::new(sound.name, volume));
            }
        }
    }

    /// Takes the sounds collected so far, ready for playback dispatch.
    pub fn take_sounds(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.pending_sounds)
    }

    /// The pairs the last update's collision pass resolved.
    pub fn collisions(&self) -> &[(EntityId, EntityId)] {
        &self.collisions
    }

    /// Drops every member flagged as removed, and strips their ids from
    /// all subgroups.
    pub fn sweep(&mut self) {
        let mut dead: SmallVec<[EntityId; 8]> = SmallVec::new();
        self.members.retain(|member| {
            if member.object.core().removed {
                dead.push(member.id);
                false
            } else {
                true
            }
        });
        if dead.is_empty() {
            return;
        }
        for subgroup in &mut self.subgroups {
            subgroup.retain(|id| !dead.contains(id));
        }
        trace!(count = dead.len(), "swept entities");
    }

    /// Draws every member in ascending (layer, id) order.
    pub fn draw(&self, gfx: &mut DrawContext, offset: Vec2) -> GameResult<()> {
        let mut order: Vec<(i32, EntityId, usize)> = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| (member.object.draw_layer(), member.id, index))
            .collect();
        order.sort_unstable_by_key(|&(layer, id, _)| (layer, id));
        for (_, _, index) in order {
            self.members[index].object.draw(gfx, offset)?;
        }
        Ok(())
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.members
            .binary_search_by_key(&id, |member| member.id)
            .ok()
    }

    /// For each collider, finds the first overlapping sibling in id order
    /// and resolves that single pair. Entities already dying are skipped
    /// on both sides.
    fn resolve_collisions(&mut self) {
        for first in 0..self.members.len() {
            let Some((first_pos, first_vel, first_collider)) = probe(&self.members[first]) else {
                continue;
            };
            let mut found = None;
            for second in 0..self.members.len() {
                if second == first {
                    continue;
                }
                let Some(other) = probe(&self.members[second]) else {
                    continue;
                };
                if collides(first_pos, first_collider.radius, other.0, other.2.radius) {
                    found = Some((second, other));
                    break;
                }
            }
            let Some((second, (second_pos, second_vel, second_collider))) = found else {
                continue;
            };
            let first_impact = resolve_collision(
                first_pos,
                first_vel,
                &first_collider,
                second_pos,
                second_vel,
                second_collider.radius,
            );
            let second_impact = resolve_collision(
                second_pos,
                second_vel,
                &second_collider,
                first_pos,
                first_vel,
                first_collider.radius,
            );
            apply_impact(self.members[first].object.as_mut(), first_impact);
            apply_impact(self.members[second].object.as_mut(), second_impact);
            self.collisions.push((self.members[first].id, self.members[second].id));
        }
    }

    /// Bounces anything with a hitbox and velocity off the playfield
    /// borders.
    fn resolve_borders(&mut self, ctx: &UpdateContext) {
        let bounds = ctx.view.bounds;
        for member in &mut self.members {
            let object = member.object.as_mut();
            let Some(hitbox) = object.hitbox().copied() else {
                continue;
            };
            let Some(velocity) = object.velocity().map(|v| v.velocity) else {
                continue;
            };
            let bounce = object.collider().map_or(1.0, |collider| collider.bounce);
            let rect = hitbox.rect(object.core().position);
            if let Some(impact) = resolve_border_collision(rect, velocity, bounds, bounce) {
                apply_impact(object, impact);
            }
        }
    }
}

impl Default for ObjectGroup {
    fn default() -> Self {
        Self::new()
    }
}

fn probe(member: &Member) -> Option<(Vec2, Vec2, Collider)> {
    let object = member.object.as_ref();
    if object.core().dying {
        return None;
    }
    let collider = *object.collider()?;
    let velocity = object.velocity().map_or(Vec2::ZERO, |v| v.velocity);
    Some((object.core().position, velocity, collider))
}

fn apply_impact(object: &mut dyn GameObject, impact: Impact) {
    object.core_mut().position = impact.position;
    if let Some(velocity) = object.velocity_mut() {
        velocity.velocity = impact.velocity;
    }
}

fn attenuation(listener: Option<Vec2>, position: Vec2, full_volume_radius: f32) -> f32 {
    let Some(listener) = listener else {
        return 1.0;
    };
    let distance = listener.distance(position);
    if distance <= full_volume_radius {
        1.0
    } else {
        full_volume_radius / distance
    }
}
