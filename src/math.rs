//! Small math helpers shared by physics, rendering and entity code.
//!
//! World coordinates are screen-like (y grows downward). Angles are in
//! degrees, measured counter-clockwise from the +X axis, so a rotation of
//! 90 points straight up on screen.

use glam::Vec2;

/// Normalizes an angle in degrees into the half-open range (-180, 180].
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Builds a vector from an angle in degrees and a magnitude.
pub fn from_polar(angle: f32, magnitude: f32) -> Vec2 {
    let radians = angle.to_radians();
    Vec2::new(radians.cos() * magnitude, -radians.sin() * magnitude)
}

/// The angle of a vector in degrees, the inverse of [`from_polar`].
/// A zero vector reports 0.
pub fn angle_of(v: Vec2) -> f32 {
    (-v.y).atan2(v.x).to_degrees()
}

/// Reflects `v` about the plane perpendicular to `normal`.
///
/// Returns `None` when the normal cannot be normalized or the reflected
/// vector collapses to (nearly) zero, such as two objects occupying the
/// exact same position.
pub fn reflect(v: Vec2, normal: Vec2) -> Option<Vec2> {
    let normal = normal.try_normalize()?;
    let reflected = v - 2.0 * v.dot(normal) * normal;
    if reflected.length_squared() <= f32::EPSILON {
        None
    } else {
        Some(reflected)
    }
}

/// An axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub min: Vec2,
    pub max: Vec2,
}

impl RectF {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Builds a rectangle centered on `center` with the given size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &RectF) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x && self.min.y <= other.max.y && self.max.y >= other.min.y
    }
}
