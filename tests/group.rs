use driftbelt::entity::group::ObjectGroup;
use driftbelt::entity::{GroupTags, UpdateContext};
use driftbelt::input::InputFrame;
use glam::Vec2;
use speculoos::prelude::*;

mod common;
use common::{standard_tags, Orb};

/// Runs one full group tick with no input and the given listener.
fn tick(group: &mut ObjectGroup, tags: GroupTags, listener: Option<Vec2>) {
    let input = InputFrame::default();
    let mut view = common::world_view();
    view.player_pos = listener;
    let mut ctx = UpdateContext {
        input: &input,
        data: common::game_data(),
        view,
        tags,
        spawns: Vec::new(),
    };
    group.update(&mut ctx);
}

#[test]
fn test_subgroups_mirror_membership() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let tagged = group.spawn_tagged(Box::new(Orb::new(Vec2::ZERO)), &[tags.rocks]);
    let plain = group.spawn(Box::new(Orb::new(Vec2::ONE)));

    assert_that(&group.len()).is_equal_to(2);
    assert_that(&group.in_subgroup(tags.rocks, tagged)).is_true();
    assert_that(&group.in_subgroup(tags.rocks, plain)).is_false();
    assert_that(&group.subgroup_len(tags.rocks)).is_equal_to(1);
}

#[test]
fn test_parent_removal_strips_every_subgroup() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let orb = group.spawn_tagged(Box::new(Orb::new(Vec2::ZERO)), &[tags.rocks, tags.pickups]);

    assert!(group.remove(orb).is_some());
    assert_that(&group.contains(orb)).is_false();
    assert_that(&group.subgroup_len(tags.rocks)).is_equal_to(0);
    assert_that(&group.subgroup_len(tags.pickups)).is_equal_to(0);
}

#[test]
fn test_subgroup_removal_keeps_the_parent() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let orb = group.spawn_tagged(Box::new(Orb::new(Vec2::ZERO)), &[tags.rocks]);

    group.remove_from_subgroup(tags.rocks, orb);

    assert_that(&group.contains(orb)).is_true();
    assert_that(&group.in_subgroup(tags.rocks, orb)).is_false();
}

#[test]
fn test_sweep_drops_flagged_members() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let doomed = group.spawn_tagged(Box::new(Orb::new(Vec2::ZERO)), &[tags.effects]);
    let kept = group.spawn(Box::new(Orb::new(Vec2::ONE)));

    group.get_mut(doomed).unwrap().force_kill();
    group.sweep();

    assert_that(&group.contains(doomed)).is_false();
    assert_that(&group.contains(kept)).is_true();
    assert_that(&group.subgroup_len(tags.effects)).is_equal_to(0);
}

#[test]
fn test_context_spawns_join_after_the_update_pass() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let input = InputFrame::default();
    let mut ctx = UpdateContext {
        input: &input,
        data: common::game_data(),
        view: common::world_view(),
        tags,
        spawns: Vec::new(),
    };
    ctx.spawn_tagged(Box::new(Orb::new(Vec2::new(50.0, 50.0))), &[tags.bullets]);

    group.update(&mut ctx);

    assert_that(&group.len()).is_equal_to(1);
    assert_that(&group.subgroup_len(tags.bullets)).is_equal_to(1);
}

#[test]
fn test_head_on_pair_separates_and_reflects() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let left = group.spawn(Box::new(
        Orb::moving(Vec2::new(0.0, 40.0), Vec2::new(1.0, 0.0)).with_collider(4.0),
    ));
    let right = group.spawn(Box::new(
        Orb::moving(Vec2::new(6.0, 40.0), Vec2::new(-1.0, 0.0)).with_collider(4.0),
    ));

    tick(&mut group, tags, None);

    // Integration ran first (to 1 and 5), then the pair was resolved
    let a = group.get(left).unwrap();
    assert_that(&a.core().position).is_equal_to(Vec2::new(-3.0, 40.0));
    assert_that(&a.velocity().unwrap().velocity).is_equal_to(Vec2::new(-1.0, 0.0));
    let b = group.get(right).unwrap();
    assert_that(&b.core().position).is_equal_to(Vec2::new(9.0, 40.0));
    assert_that(&b.velocity().unwrap().velocity).is_equal_to(Vec2::new(1.0, 0.0));
    assert_eq!(group.collisions(), &[(left, right)]);
}

#[test]
fn test_exactly_touching_members_are_left_alone() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let a = group.spawn(Box::new(Orb::new(Vec2::new(100.0, 100.0)).with_collider(4.0)));
    let b = group.spawn(Box::new(Orb::new(Vec2::new(108.0, 100.0)).with_collider(4.0)));

    tick(&mut group, tags, None);

    assert!(group.collisions().is_empty());
    assert_that(&group.get(a).unwrap().core().position).is_equal_to(Vec2::new(100.0, 100.0));
    assert_that(&group.get(b).unwrap().core().position).is_equal_to(Vec2::new(108.0, 100.0));
}

#[test]
fn test_a_scan_resolves_only_the_first_overlapping_sibling() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let a = group.spawn(Box::new(Orb::new(Vec2::new(50.0, 50.0)).with_collider(4.0)));
    let b = group.spawn(Box::new(Orb::new(Vec2::new(56.0, 50.0)).with_collider(4.0)));
    let c = group.spawn(Box::new(Orb::new(Vec2::new(44.0, 50.0)).with_collider(4.0)));

    tick(&mut group, tags, None);

    // a overlapped both b and c; its own scan resolved against b only
    let pairs = group.collisions();
    assert_eq!(pairs[0], (a, b));
    assert!(!pairs.contains(&(a, c)));
}

#[test]
fn test_dying_members_do_not_collide() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let ghost = group.spawn(Box::new(Orb::new(Vec2::new(50.0, 50.0)).with_collider(4.0)));
    let live = group.spawn(Box::new(Orb::new(Vec2::new(53.0, 50.0)).with_collider(4.0)));

    group.get_mut(ghost).unwrap().core_mut().dying = true;
    tick(&mut group, tags, None);

    assert!(group.collisions().is_empty());
    assert_that(&group.get(live).unwrap().core().position).is_equal_to(Vec2::new(53.0, 50.0));
}

#[test]
fn test_border_pass_bounces_hitbox_entities() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let orb = group.spawn(Box::new(
        Orb::moving(Vec2::new(3.0, 50.0), Vec2::new(-4.0, 0.0)).with_hitbox(Vec2::splat(8.0)),
    ));

    tick(&mut group, tags, None);

    // Integrated to -1, over the left border, then reflected back inside
    let object = group.get(orb).unwrap();
    assert_that(&object.core().position).is_equal_to(Vec2::new(4.0, 50.0));
    assert_that(&object.velocity().unwrap().velocity).is_equal_to(Vec2::new(4.0, 0.0));
}

#[test]
fn test_sounds_attenuate_with_listener_distance() {
    let mut group = ObjectGroup::new();
    let tags = standard_tags(&mut group);
    let near = group.spawn(Box::new(Orb::new(Vec2::new(100.0, 100.0))));
    let far = group.spawn(Box::new(Orb::new(Vec2::new(460.0, 100.0))));

    group.get_mut(near).unwrap().core_mut().play_sound("laser");
    group.get_mut(far).unwrap().core_mut().play_sound("laser");
    tick(&mut group, tags, Some(Vec2::new(100.0, 100.0)));

    let sounds = group.take_sounds();
    assert_that(&sounds.len()).is_equal_to(2);
    assert_that(&sounds[0].volume).is_close_to(1.0, 1e-5);
    // 360 world units out with a 180 unit full-volume radius: half volume
    assert_that(&sounds[1].volume).is_close_to(0.5, 1e-5);
    // Taking the queue drains it
    assert!(group.take_sounds().is_empty());
}
