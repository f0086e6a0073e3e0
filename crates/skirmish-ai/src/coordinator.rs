//! Crowd coordination: attack tokens and encirclement ring slots.
//!
//! One coordinator is shared by every agent fighting the same target. It
//! caps how many agents may attack at once and hands each agent a stable
//! angular slot on a ring around the target to wait in.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use glam::{Quat, Vec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skirmish_common::{AgentId, SkirmishError, SkirmishResult};
use tracing::{debug, trace};

use crate::collaborators::SharedTarget;

/// Crowd coordinator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Maximum number of agents holding an attack token at once.
    pub max_active_attackers: usize,
    /// Number of angular slots on the ring.
    pub ring_slots: usize,
    /// Ring radius around the target.
    pub ring_radius: f32,
    /// Random angular jitter added to ring positions (degrees, +/-).
    pub ring_jitter_degrees: f32,
    /// Seed for the jitter generator.
    pub seed: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_active_attackers: 2,
            ring_slots: 8,
            ring_radius: 4.0,
            ring_jitter_degrees: 10.0,
            seed: 0x5eed,
        }
    }
}

impl CoordinatorConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> SkirmishResult<()> {
        if self.ring_slots == 0 {
            return Err(SkirmishError::InvalidValue {
                field: "ring_slots".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.ring_radius.is_finite() || self.ring_radius < 0.0 {
            return Err(SkirmishError::InvalidValue {
                field: "ring_radius".to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
        if !self.ring_jitter_degrees.is_finite() || self.ring_jitter_degrees < 0.0 {
            return Err(SkirmishError::InvalidValue {
                field: "ring_jitter_degrees".to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Arbiter interface
// ============================================================================

/// Arbitration service consumed by combat agents.
pub trait AttackArbiter: Send {
    /// Registers an agent and assigns it a ring slot if it has none. Idempotent.
    fn register(&mut self, agent: AgentId);
    /// Forgets an agent's token and slot. Idempotent.
    fn unregister(&mut self, agent: AgentId);
    /// Grants a token if one is free. Returns true if the agent holds one afterwards.
    fn request_token(&mut self, agent: AgentId) -> bool;
    /// Returns a token. Idempotent.
    fn release_token(&mut self, agent: AgentId);
    /// Whether the agent holds a token.
    fn holds_token(&self, agent: AgentId) -> bool;
    /// Whether `request_token` would succeed for this agent, without side effects.
    fn has_free_token(&self, agent: AgentId) -> bool;
    /// Position on the ring for this agent, or `agent_position` if there is no target.
    fn ring_position(&mut self, agent: AgentId, agent_position: Vec3) -> Vec3;
}

/// Shared handle to an arbiter.
pub type SharedArbiter = Arc<Mutex<dyn AttackArbiter>>;

// ============================================================================
// Crowd coordinator
// ============================================================================

/// Bounded attack-token pool plus a round-robin ring slot allocator.
pub struct CrowdCoordinator {
    config: CoordinatorConfig,
    active: AHashSet<AgentId>,
    slots: AHashMap<AgentId, usize>,
    next_slot: usize,
    target: Option<SharedTarget>,
    rng: fastrand::Rng,
    peak_active: usize,
}

impl std::fmt::Debug for CrowdCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrowdCoordinator")
            .field("config", &self.config)
            .field("active", &self.active.len())
            .field("registered", &self.slots.len())
            .field("next_slot", &self.next_slot)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

impl Default for CrowdCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl CrowdCoordinator {
    /// Creates a coordinator. A slot count of zero is raised to one.
    #[must_use]
    pub fn new(mut config: CoordinatorConfig) -> Self {
        config.ring_slots = config.ring_slots.max(1);
        let rng = fastrand::Rng::with_seed(config.seed);
        Self {
            config,
            active: AHashSet::new(),
            slots: AHashMap::new(),
            next_slot: 0,
            target: None,
            rng,
            peak_active: 0,
        }
    }

    /// Sets the shared target the ring is centred on.
    #[must_use]
    pub fn with_target(mut self, target: SharedTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Replaces or clears the shared target.
    pub fn set_target(&mut self, target: Option<SharedTarget>) {
        self.target = target;
    }

    /// Wraps the coordinator in a shared handle.
    #[must_use]
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Number of agents currently holding a token.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Highest number of simultaneous token holders seen.
    #[must_use]
    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    /// Number of agents with an assigned slot.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.slots.len()
    }

    /// Ring slot assigned to an agent.
    #[must_use]
    pub fn slot_of(&self, agent: AgentId) -> Option<usize> {
        self.slots.get(&agent).copied()
    }

    fn assign_slot(&mut self, agent: AgentId) -> usize {
        if let Some(slot) = self.slots.get(&agent) {
            return *slot;
        }
        let slot = self.next_slot % self.config.ring_slots;
        self.next_slot = self.next_slot.wrapping_add(1);
        self.slots.insert(agent, slot);
        trace!(%agent, slot, "Ring slot assigned");
        slot
    }

    fn slot_angle_degrees(&mut self, slot: usize) -> f32 {
        let base = 360.0 / self.config.ring_slots as f32 * slot as f32;
        let jitter = self.config.ring_jitter_degrees;
        if jitter > 0.0 {
            base + (self.rng.f32() * 2.0 - 1.0) * jitter
        } else {
            base
        }
    }
}

impl AttackArbiter for CrowdCoordinator {
    fn register(&mut self, agent: AgentId) {
        self.assign_slot(agent);
    }

    fn unregister(&mut self, agent: AgentId) {
        let held = self.active.remove(&agent);
        let slot = self.slots.remove(&agent);
        if held || slot.is_some() {
            debug!(%agent, held, "Agent unregistered from coordinator");
        }
    }

    fn request_token(&mut self, agent: AgentId) -> bool {
        if self.active.contains(&agent) {
            return true;
        }
        if self.active.len() >= self.config.max_active_attackers {
            return false;
        }
        self.active.insert(agent);
        self.peak_active = self.peak_active.max(self.active.len());
        debug!(%agent, active = self.active.len(), "Attack token granted");
        true
    }

    fn release_token(&mut self, agent: AgentId) {
        if self.active.remove(&agent) {
            debug!(%agent, active = self.active.len(), "Attack token released");
        }
    }

    fn holds_token(&self, agent: AgentId) -> bool {
        self.active.contains(&agent)
    }

    fn has_free_token(&self, agent: AgentId) -> bool {
        self.active.contains(&agent) || self.active.len() < self.config.max_active_attackers
    }

    fn ring_position(&mut self, agent: AgentId, agent_position: Vec3) -> Vec3 {
        let centre = match self
            .target
            .as_ref()
            .and_then(|target| target.lock().current_target_transform())
        {
            Some(transform) => transform.position,
            None => return agent_position,
        };

        let slot = self.assign_slot(agent);
        let angle = self.slot_angle_degrees(slot).to_radians();
        centre + Quat::from_rotation_y(angle) * (Vec3::Z * self.config.ring_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MockTarget;
    use proptest::prelude::*;

    fn config(max: usize, slots: usize) -> CoordinatorConfig {
        CoordinatorConfig {
            max_active_attackers: max,
            ring_slots: slots,
            ring_radius: 4.0,
            ring_jitter_degrees: 0.0,
            seed: 1,
        }
    }

    #[test]
    fn test_round_robin_wraps() {
        let mut coordinator = CrowdCoordinator::new(config(2, 8));
        let agents: Vec<AgentId> = (1..=9).map(AgentId::from_raw).collect();
        for agent in &agents {
            coordinator.register(*agent);
        }

        assert_eq!(coordinator.slot_of(agents[0]), Some(0));
        assert_eq!(coordinator.slot_of(agents[7]), Some(7));
        assert_eq!(coordinator.slot_of(agents[8]), Some(0));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut coordinator = CrowdCoordinator::new(config(2, 8));
        let a = AgentId::from_raw(1);
        let b = AgentId::from_raw(2);
        coordinator.register(a);
        coordinator.register(a);
        coordinator.register(b);

        assert_eq!(coordinator.slot_of(a), Some(0));
        assert_eq!(coordinator.slot_of(b), Some(1));
    }

    #[test]
    fn test_token_cap() {
        let mut coordinator = CrowdCoordinator::new(config(2, 8));
        let (a, b, c) = (AgentId::from_raw(1), AgentId::from_raw(2), AgentId::from_raw(3));

        assert!(coordinator.request_token(a));
        assert!(coordinator.request_token(a));
        assert!(coordinator.request_token(b));
        assert!(!coordinator.request_token(c));
        assert_eq!(coordinator.active_count(), 2);
        assert!(!coordinator.has_free_token(c));
        assert!(coordinator.has_free_token(a));

        coordinator.release_token(a);
        coordinator.release_token(a);
        assert_eq!(coordinator.active_count(), 1);
        assert!(coordinator.request_token(c));
        assert_eq!(coordinator.peak_active(), 2);
    }

    #[test]
    fn test_unregister_keeps_other_slots() {
        let mut coordinator = CrowdCoordinator::new(config(2, 4));
        let agents: Vec<AgentId> = (1..=3).map(AgentId::from_raw).collect();
        for agent in &agents {
            coordinator.register(*agent);
        }
        coordinator.request_token(agents[1]);

        coordinator.unregister(agents[1]);
        coordinator.unregister(agents[1]);

        assert_eq!(coordinator.slot_of(agents[1]), None);
        assert!(!coordinator.holds_token(agents[1]));
        assert_eq!(coordinator.slot_of(agents[2]), Some(2));

        // The cursor keeps advancing; the freed slot is not handed back.
        let late = AgentId::from_raw(4);
        coordinator.register(late);
        assert_eq!(coordinator.slot_of(late), Some(3));
    }

    #[test]
    fn test_ring_position_without_target() {
        let mut coordinator = CrowdCoordinator::new(config(2, 8));
        let agent = AgentId::from_raw(1);
        let here = Vec3::new(3.0, 0.0, -2.0);

        assert_eq!(coordinator.ring_position(agent, here), here);
    }

    #[test]
    fn test_ring_position_lazily_assigns_slot() {
        let target = MockTarget::at(Vec3::new(10.0, 0.0, 10.0)).shared();
        let mut coordinator = CrowdCoordinator::new(config(2, 4)).with_target(target);
        let first = AgentId::from_raw(1);
        let second = AgentId::from_raw(2);

        let p0 = coordinator.ring_position(first, Vec3::ZERO);
        let p1 = coordinator.ring_position(second, Vec3::ZERO);

        assert_eq!(coordinator.slot_of(first), Some(0));
        assert_eq!(coordinator.slot_of(second), Some(1));
        assert!(p0.abs_diff_eq(Vec3::new(10.0, 0.0, 14.0), 1e-4));
        assert!(p1.abs_diff_eq(Vec3::new(14.0, 0.0, 10.0), 1e-4));
    }

    #[test]
    fn test_ring_jitter_is_bounded() {
        let target = MockTarget::at(Vec3::ZERO).shared();
        let mut cfg = config(2, 8);
        cfg.ring_jitter_degrees = 10.0;
        let mut coordinator = CrowdCoordinator::new(cfg).with_target(target);
        let agent = AgentId::from_raw(1);

        for _ in 0..32 {
            let position = coordinator.ring_position(agent, Vec3::ZERO);
            assert!((position.length() - 4.0).abs() < 1e-3);
            let angle = position.x.atan2(position.z).to_degrees();
            assert!(angle.abs() <= 10.0 + 1e-3);
        }
    }

    #[test]
    fn test_zero_slots_rejected_by_validate() {
        let cfg = config(2, 0);
        assert!(cfg.validate().is_err());
        let coordinator = CrowdCoordinator::new(cfg);
        assert_eq!(coordinator.config().ring_slots, 1);
    }

    proptest! {
        #[test]
        fn prop_active_never_exceeds_cap(
            max in 0usize..5,
            ops in proptest::collection::vec((0u64..10, any::<bool>()), 0..64),
        ) {
            let mut coordinator = CrowdCoordinator::new(config(max, 8));
            for (raw, request) in ops {
                let agent = AgentId::from_raw(raw);
                if request {
                    let before = coordinator.active_count();
                    let held = coordinator.holds_token(agent);
                    let granted = coordinator.request_token(agent);
                    if !granted {
                        prop_assert_eq!(coordinator.active_count(), before);
                    }
                    if !held && before >= max {
                        prop_assert!(!granted);
                    }
                } else {
                    coordinator.release_token(agent);
                }
                prop_assert!(coordinator.active_count() <= max);
            }
        }
    }
}
