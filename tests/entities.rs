use driftbelt::entity::asteroid::{Asteroid, AsteroidSize};
use driftbelt::entity::bullet::{Bullet, BulletSource, LIFETIME_TICKS};
use driftbelt::entity::effect::Effect;
use driftbelt::entity::group::ObjectGroup;
use driftbelt::entity::powerup::PowerupKind;
use driftbelt::entity::saucer::Saucer;
use driftbelt::entity::ship::{Ship, ShipEffects};
use driftbelt::entity::{
    draw_rotation, interpolated_center, GameObject, GroupTags, UpdateContext, Velocity,
};
use driftbelt::input::{Action, InputFrame};
use glam::Vec2;
use speculoos::prelude::*;

mod common;

fn scratch_tags() -> GroupTags {
    let mut group = ObjectGroup::new();
    common::standard_tags(&mut group)
}

fn test_ctx(input: &InputFrame) -> UpdateContext<'_> {
    UpdateContext {
        input,
        data: common::game_data(),
        view: common::world_view(),
        tags: scratch_tags(),
        spawns: Vec::new(),
    }
}

fn spawned_rock_sizes(ctx: &UpdateContext) -> Vec<AsteroidSize> {
    ctx.spawns
        .iter()
        .filter_map(|pending| pending.object.as_any().downcast_ref::<Asteroid>())
        .map(Asteroid::size)
        .collect()
}

fn spawned_bullet_count(ctx: &UpdateContext) -> usize {
    ctx.spawns
        .iter()
        .filter(|pending| pending.object.as_any().is::<Bullet>())
        .count()
}

#[test]
fn test_large_rock_takes_two_hits() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut rock =
        Asteroid::new(data, Vec2::new(100.0, 100.0), Vec2::ZERO, AsteroidSize::Large).unwrap();

    rock.hit(1, &mut ctx);
    assert_that(&rock.core().dying).is_false();
    // The surviving hit is still audible
    assert_eq!(rock.core().sounds.len(), 1);
    assert_eq!(rock.core().sounds[0].name, "explode_small");

    rock.hit(1, &mut ctx);
    assert_that(&rock.core().dying).is_true();
    assert_eq!(rock.core().sounds.last().map(|sound| sound.name), Some("explode_big"));
}

#[test]
fn test_destroyed_large_rock_splits_into_mediums() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut rock = Asteroid::new(
        data,
        Vec2::new(100.0, 100.0),
        Vec2::new(1.0, 0.0),
        AsteroidSize::Large,
    )
    .unwrap();

    rock.kill(&mut ctx);

    assert_eq!(
        spawned_rock_sizes(&ctx),
        vec![AsteroidSize::Medium, AsteroidSize::Medium]
    );
}

#[test]
fn test_small_rocks_do_not_split() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut rock =
        Asteroid::new(data, Vec2::new(100.0, 100.0), Vec2::ZERO, AsteroidSize::Small).unwrap();

    rock.kill(&mut ctx);

    assert_that(&spawned_rock_sizes(&ctx)).is_empty();
}

#[test]
fn test_dying_rock_leaves_after_its_break_animation() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut rock =
        Asteroid::new(data, Vec2::new(100.0, 100.0), Vec2::ZERO, AsteroidSize::Medium).unwrap();

    rock.kill(&mut ctx);
    assert_that(&rock.core().removed).is_false();

    let mut updates = 0;
    while !rock.core().removed && updates < 50 {
        rock.update(&mut ctx);
        updates += 1;
    }

    // Three break frames at two ticks each
    assert_that(&rock.core().removed).is_true();
    assert_eq!(updates, 6);
}

#[test]
fn test_bullets_expire_after_their_lifetime() {
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut bullet = Bullet::new(Vec2::new(100.0, 100.0), 90.0, BulletSource::Player).unwrap();

    for _ in 0..LIFETIME_TICKS - 1 {
        bullet.update(&mut ctx);
    }
    assert_that(&bullet.core().removed).is_false();

    bullet.update(&mut ctx);
    assert_that(&bullet.core().removed).is_true();
}

#[test]
fn test_player_bullets_move_at_player_speed() {
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut bullet = Bullet::new(Vec2::new(100.0, 100.0), 0.0, BulletSource::Player).unwrap();
    assert_eq!(bullet.source(), BulletSource::Player);

    bullet.update(&mut ctx);

    let position = bullet.core().position;
    assert_that(&position.x).is_close_to(112.0, 1e-4);
    assert_that(&position.y).is_close_to(100.0, 1e-4);
}

#[test]
fn test_thrust_accelerates_along_the_facing() {
    let data = common::game_data();
    let input = InputFrame::with_held(&[(Action::Up, 1)]);
    let mut ctx = test_ctx(&input);
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();

    ship.update(&mut ctx);

    // The ship spawns facing up, which is negative y
    let velocity = ship.velocity().unwrap().velocity;
    assert_that(&velocity.y).is_less_than(0.0);
    assert_that(&velocity.x.abs()).is_less_than(1e-4);
}

#[test]
fn test_fire_has_a_cooldown() {
    let data = common::game_data();
    let input = InputFrame::with_tapped(&[Action::Fire]);
    let mut ctx = test_ctx(&input);
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();

    ship.update(&mut ctx);
    assert_eq!(spawned_bullet_count(&ctx), 1);

    // The tap repeats but the cooldown has not run out yet
    ship.update(&mut ctx);
    assert_eq!(spawned_bullet_count(&ctx), 1);
}

#[test]
fn test_rapid_fire_shortens_the_cooldown() {
    let data = common::game_data();
    let input = InputFrame::with_held(&[(Action::Fire, 1)]);
    let mut ctx = test_ctx(&input);
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();
    ship.grant(PowerupKind::RapidFire);

    for _ in 0..7 {
        ship.update(&mut ctx);
    }

    // Shots on the first update and every second one after
    assert_eq!(spawned_bullet_count(&ctx), 4);
}

#[test]
fn test_holding_fire_without_rapid_fire_does_nothing() {
    let data = common::game_data();
    let input = InputFrame::with_held(&[(Action::Fire, 1)]);
    let mut ctx = test_ctx(&input);
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();

    for _ in 0..5 {
        ship.update(&mut ctx);
    }

    assert_eq!(spawned_bullet_count(&ctx), 0);
}

#[test]
fn test_shield_absorbs_one_hit() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();

    // Run out the spawn grace period first
    for _ in 0..40 {
        ship.update(&mut ctx);
    }
    ship.grant(PowerupKind::Shield);
    assert_that(&ship.effects().contains(ShipEffects::SHIELD)).is_true();

    ship.hit(1, &mut ctx);
    assert_that(&ship.is_dead()).is_false();
    assert_that(&ship.effects().contains(ShipEffects::SHIELD)).is_false();

    // Losing the shield grants a short grace period of its own
    ship.hit(1, &mut ctx);
    assert_that(&ship.is_dead()).is_false();

    for _ in 0..20 {
        ship.update(&mut ctx);
    }
    ship.hit(1, &mut ctx);
    assert_that(&ship.is_dead()).is_true();
}

#[test]
fn test_extra_life_is_not_a_ship_effect() {
    let data = common::game_data();
    let mut ship = Ship::new(data, Vec2::new(200.0, 200.0)).unwrap();

    ship.grant(PowerupKind::ExtraLife);

    assert_that(&ship.effects().is_empty()).is_true();
}

#[test]
fn test_saucer_soaks_three_hits() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut saucer = Saucer::new(data, Vec2::new(400.0, 200.0)).unwrap();

    saucer.hit(1, &mut ctx);
    saucer.hit(1, &mut ctx);
    assert_that(&saucer.core().dying).is_false();

    saucer.hit(1, &mut ctx);
    assert_that(&saucer.core().dying).is_true();
    assert_eq!(saucer.score_value(), 200);
}

#[test]
fn test_saucer_fires_at_a_player_in_range() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    ctx.view.player_pos = Some(Vec2::new(430.0, 200.0));
    let mut saucer = Saucer::new(data, Vec2::new(400.0, 200.0)).unwrap();

    for _ in 0..25 {
        saucer.update(&mut ctx);
    }

    let fired = ctx.spawns.iter().any(|pending| {
        pending
            .object
            .as_any()
            .downcast_ref::<Bullet>()
            .is_some_and(|bullet| bullet.source() == BulletSource::Saucer)
    });
    assert_that(&fired).is_true();
}

#[test]
fn test_spark_effect_plays_once_and_removes_itself() {
    let data = common::game_data();
    let input = InputFrame::default();
    let mut ctx = test_ctx(&input);
    let mut spark = Effect::spark(data, Vec2::new(50.0, 50.0)).unwrap();

    let mut updates = 0;
    while !spark.core().removed && updates < 50 {
        spark.update(&mut ctx);
        updates += 1;
    }

    // Three frames at two ticks each
    assert_eq!(updates, 6);
}

#[test]
fn test_velocity_is_clamped_to_its_cap() {
    let mut velocity = Velocity::with_velocity(Vec2::new(30.0, 40.0), 25.0);
    let mut position = Vec2::ZERO;

    velocity.update(&mut position);

    // Capped to 25 along the same heading, and integrated at the cap
    assert_eq!(velocity.velocity, Vec2::new(15.0, 20.0));
    assert_eq!(position, Vec2::new(15.0, 20.0));

    let mut slow = Velocity::with_velocity(Vec2::new(3.0, 4.0), 25.0);
    slow.update(&mut position);
    assert_eq!(slow.velocity, Vec2::new(3.0, 4.0));
}

#[test]
fn test_draw_position_rewinds_by_the_uncaught_velocity() {
    let position = Vec2::new(100.0, 50.0);
    let velocity = Vec2::new(8.0, -4.0);

    // At lerp 0 the draw sits a full step behind; at 1 it has caught up
    assert_eq!(
        interpolated_center(position, Some(velocity), 0.0, Vec2::ZERO),
        Vec2::new(92.0, 54.0)
    );
    assert_eq!(interpolated_center(position, Some(velocity), 1.0, Vec2::ZERO), position);

    // Without a velocity only the offset applies
    assert_eq!(
        interpolated_center(position, None, 0.3, Vec2::new(2.0, 2.0)),
        Vec2::new(102.0, 52.0)
    );
}

#[test]
fn test_draw_rotation_rewinds_angular_velocity() {
    assert_eq!(draw_rotation(90.0, 6.0, 1.0, 0.0), -90.0);
    assert_eq!(draw_rotation(90.0, 6.0, 0.0, 0.0), -84.0);
    assert_eq!(draw_rotation(90.0, 6.0, 1.0, 45.0), -135.0);
}
