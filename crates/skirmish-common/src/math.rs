//! Transform and horizontal-plane math helpers.
//!
//! World space is y-up. An agent's forward axis is `+Z` of its rotation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Squared length below which a direction is treated as degenerate.
pub const DEGENERATE_EPSILON_SQ: f32 = 1e-8;

/// Position and orientation of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position
    pub position: Vec3,
    /// World rotation (yaw-only for ground agents)
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Creates a transform at a position with identity rotation.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Sets the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Backward direction.
    #[must_use]
    pub fn backward(&self) -> Vec3 {
        -self.forward()
    }

    /// Forward direction projected onto the ground plane.
    ///
    /// Falls back to `+Z` if the agent is looking straight up or down.
    #[must_use]
    pub fn flat_forward(&self) -> Vec3 {
        let flat = flatten(self.forward());
        if flat.length_squared() < DEGENERATE_EPSILON_SQ {
            Vec3::Z
        } else {
            flat.normalize()
        }
    }

    /// Transforms a local-space offset into world space.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Snaps the rotation to face a world point on the horizontal plane.
    pub fn face_towards(&mut self, point: Vec3) {
        if let Some(rotation) = yaw_rotation(point - self.position) {
            self.rotation = rotation;
        }
    }

    /// Turns towards a world point, limited by `max_step` (slerp factor in 0..=1).
    pub fn turn_towards(&mut self, point: Vec3, max_step: f32) {
        if let Some(target) = yaw_rotation(point - self.position) {
            self.rotation = self.rotation.slerp(target, max_step.clamp(0.0, 1.0));
        }
    }
}

/// Zeroes the vertical component of a vector.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Normalized horizontal direction, or `None` if degenerate.
#[must_use]
pub fn horizontal_direction(v: Vec3) -> Option<Vec3> {
    let flat = flatten(v);
    if flat.length_squared() < DEGENERATE_EPSILON_SQ {
        None
    } else {
        Some(flat.normalize())
    }
}

/// Yaw-only rotation whose forward axis points along `direction` (y ignored).
#[must_use]
pub fn yaw_rotation(direction: Vec3) -> Option<Quat> {
    horizontal_direction(direction).map(|dir| Quat::from_rotation_y(dir.x.atan2(dir.z)))
}

/// Angle in degrees between two vectors.
///
/// A degenerate input yields `0.0`, so a target at the exact same spot is
/// always considered in front.
#[must_use]
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < DEGENERATE_EPSILON_SQ || b.length_squared() < DEGENERATE_EPSILON_SQ {
        return 0.0;
    }
    let cos = (a.normalize().dot(b.normalize())).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Linear remap of `value` from `[from_min, from_max]` to `0..=1`, clamped.
///
/// A collapsed input range returns `0.0` below the threshold and `1.0` at or above it.
#[must_use]
pub fn inverse_lerp_clamped(from_min: f32, from_max: f32, value: f32) -> f32 {
    let span = from_max - from_min;
    if span.abs() <= f32::EPSILON {
        return if value >= from_max { 1.0 } else { 0.0 };
    }
    ((value - from_min) / span).clamp(0.0, 1.0)
}
