//! Pure collision math, separated from the entities so it can be tested
//! without building a world.

use glam::Vec2;

use crate::entity::Collider;
use crate::math::{reflect, RectF};

/// The outcome of resolving a collision: where the entity ends up and the
/// velocity it leaves with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Whether two circles overlap.
///
/// Exactly touching circles do not count; only real overlap does.
pub fn collides(first: Vec2, first_radius: f32, second: Vec2, second_radius: f32) -> bool {
    let combined = first_radius + second_radius;
    first.distance_squared(second) < combined * combined
}

/// Resolves one side of a circle-circle collision.
///
/// The entity is pushed out along the contact normal to exactly the
/// combined radius from the other circle, and leaves along its reflected
/// heading at the pair's average speed scaled by its own bounce. When the
/// two circles share a position the normal is undefined and the entity
/// simply stops.
pub fn resolve_collision(
    position: Vec2,
    velocity: Vec2,
    collider: &Collider,
    other_position: Vec2,
    other_velocity: Vec2,
    other_radius: f32,
) -> Impact {
    let Some(normal) = (position - other_position).try_normalize() else {
        return Impact {
            position,
            velocity: Vec2::ZERO,
        };
    };

    let combined = collider.radius + other_radius;
    let resolved_position = other_position + normal * combined;

    let average_speed = (velocity.length() + other_velocity.length()) / 2.0;
    let resolved_velocity = match reflect(velocity, normal) {
        Some(reflected) => reflected.normalize_or_zero() * average_speed * collider.bounce,
        None => Vec2::ZERO,
    };

    Impact {
        position: resolved_position,
        velocity: resolved_velocity,
    }
}

/// Bounces `rect` off the playfield borders.
///
/// Each axis is handled independently and only corrects when the entity
/// is moving toward the border it overlaps, so an entity already heading
/// back inside is left alone. Returns None when nothing needed fixing.
pub fn resolve_border_collision(rect: RectF, velocity: Vec2, bounds: RectF, bounce: f32) -> Option<Impact> {
    let mut center = rect.center();
    let half = rect.size() / 2.0;
    let mut velocity = velocity;
    let mut hit = false;

    if rect.left() < bounds.left() && velocity.x < 0.0 {
        center.x = bounds.left() + half.x;
        velocity.x = -velocity.x * bounce;
        hit = true;
    } else if rect.right() > bounds.right() && velocity.x > 0.0 {
        center.x = bounds.right() - half.x;
        velocity.x = -velocity.x * bounce;
        hit = true;
    }

    if rect.top() < bounds.top() && velocity.y < 0.0 {
        center.y = bounds.top() + half.y;
        velocity.y = -velocity.y * bounce;
        hit = true;
    } else if rect.bottom() > bounds.bottom() && velocity.y > 0.0 {
        center.y = bounds.bottom() - half.y;
        velocity.y = -velocity.y * bounce;
        hit = true;
    }

    hit.then_some(Impact {
        position: center,
        velocity,
    })
}
