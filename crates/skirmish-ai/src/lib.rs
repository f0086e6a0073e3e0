//! # Skirmish AI
//!
//! Combat decision core for hostile agents.
//!
//! This crate provides:
//! - Per-agent combat state machine (patrol, chase, circle, attack)
//! - Phased melee swing timer
//! - Crowd coordinator for attack tokens and encirclement ring slots
//! - Hit reactions (flinch, knockback, knockdown)
//! - Collaborator interfaces and mocks for navigation, animation and targets
//! - Event bus for combat observers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod hit_reaction;
pub mod melee;
pub mod profile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::collaborators::*;
    pub use crate::config::*;
    pub use crate::coordinator::*;
    pub use crate::events::*;
    pub use crate::hit_reaction::*;
    pub use crate::melee::*;
    pub use crate::profile::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use skirmish_common::Transform;

    #[test]
    fn test_crowd_caps_concurrent_attackers() {
        let target = MockTarget::at(Vec3::new(0.0, 0.0, 1.5)).shared();
        let coordinator = CrowdCoordinator::new(CoordinatorConfig {
            max_active_attackers: 2,
            ..CoordinatorConfig::default()
        })
        .with_target(target.clone())
        .shared();

        let mut agents: Vec<CombatAgent<MockNavigator>> = (0..5)
            .map(|i| {
                let offset = (i as f32 - 2.0) * 0.3;
                CombatAgent::new(
                    AgentConfig::default(),
                    Transform::at(Vec3::new(offset, 0.0, 0.0)),
                    MockNavigator::new(),
                )
                .with_target(target.clone())
                .with_coordinator(coordinator.clone())
                .with_seed(i)
            })
            .collect();

        let mut time = 0.0;
        for _ in 0..120 {
            for agent in &mut agents {
                agent.update(&FrameContext::new(time, 0.05));
            }
            time += 0.05;

            let attackers = agents.iter().filter(|a| a.has_token()).count();
            assert!(attackers <= 2);
            assert_eq!(coordinator.lock().active_count(), attackers);
        }
        assert_eq!(coordinator.lock().peak_active(), 2);
        assert!(target.lock().total_damage() > 0.0);
    }
}
