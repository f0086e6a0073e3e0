//! # Skirmish Common
//!
//! Common types, utilities, and shared abstractions for Project Skirmish.
//!
//! This crate provides foundational types used across all Skirmish subsystems:
//! - Agent identifiers
//! - Transform and horizontal-plane math helpers on top of `glam`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_agent_id_generation() {
        let id1 = AgentId::new();
        let id2 = AgentId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!AgentId::NULL.is_valid());
    }

    #[test]
    fn test_transform_facing_target() {
        let mut transform = Transform::at(Vec3::ZERO);
        transform.face_towards(Vec3::new(5.0, 3.0, 0.0));

        assert!(transform.forward().abs_diff_eq(Vec3::X, 1e-5));
        assert!(transform.backward().abs_diff_eq(-Vec3::X, 1e-5));
    }
}
