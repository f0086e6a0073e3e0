//! Headless arena simulation.
//!
//! Spawns a ring of agents around a scripted target, shares one crowd
//! coordinator between them and steps everything in a single fixed-rate
//! frame loop. Movement is integrated by a straight-line navigator; scheduled
//! hits, stuns and suppression windows exercise the reaction paths.

use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use skirmish_ai::{
    AgentState, CombatAgent, CombatEvent, CombatTarget, CrowdCoordinator, EventBus,
    FrameContext, Navigator, ObstructionQuery, ReactionKind, WaveTracker,
};
use skirmish_common::{flatten, horizontal_direction, Transform, WaveTag};
use tracing::{debug, info, warn};

use crate::config::{ArenaConfig, Pillar};

// ============================================================================
// Navigator
// ============================================================================

/// Straight-line navigator with no path planning.
#[derive(Debug, Clone)]
pub struct ArenaNavigator {
    position: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    stopped: bool,
    velocity: Vec3,
    update_position: bool,
    update_rotation: bool,
}

impl ArenaNavigator {
    /// Turn factor applied per step when rotating towards the travel direction.
    const TURN_FACTOR: f32 = 0.2;

    /// Creates a navigator anchored at `position`.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            destination: None,
            speed: 0.0,
            stopped: false,
            velocity: Vec3::ZERO,
            update_position: true,
            update_rotation: true,
        }
    }

    /// Moves towards the destination and writes the result into `body`.
    pub fn advance(&mut self, body: &mut Transform, dt: f32) {
        self.velocity = Vec3::ZERO;
        if self.stopped || !self.update_position {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let to_destination = flatten(destination - self.position);
        let distance = to_destination.length();
        let step = (self.speed * dt).min(distance);
        if let Some(direction) = horizontal_direction(to_destination) {
            self.position += direction * step;
            if dt > 0.0 {
                self.velocity = direction * (step / dt);
            }
            if self.update_rotation {
                body.turn_towards(self.position + direction, Self::TURN_FACTOR);
            }
        }
        body.position = self.position;
    }
}

impl Navigator for ArenaNavigator {
    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::ZERO;
        }
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| flatten(destination - self.position).length())
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn warp_to(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    fn set_authority(&mut self, update_position: bool, update_rotation: bool) {
        self.update_position = update_position;
        self.update_rotation = update_rotation;
    }
}

// ============================================================================
// Target
// ============================================================================

/// Target that walks a circle around the arena centre.
#[derive(Debug, Clone)]
pub struct OrbitingTarget {
    centre: Vec3,
    radius: f32,
    angular_speed: f32,
    angle: f32,
    transform: Transform,
    /// Damage received so far
    pub damage_taken: f32,
    /// Number of hits received
    pub hits_taken: u32,
}

impl OrbitingTarget {
    /// Creates a target on its orbit at angle zero.
    #[must_use]
    pub fn new(centre: Vec3, radius: f32, angular_speed: f32) -> Self {
        let mut target = Self {
            centre,
            radius,
            angular_speed,
            angle: 0.0,
            transform: Transform::at(centre),
            damage_taken: 0.0,
            hits_taken: 0,
        };
        target.place();
        target
    }

    /// Advances the orbit.
    pub fn advance(&mut self, dt: f32) {
        self.angle += self.angular_speed * dt;
        self.place();
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn place(&mut self) {
        let offset = Quat::from_rotation_y(self.angle) * (Vec3::Z * self.radius);
        let position = self.centre + offset;
        // Face along the direction of travel.
        let heading = Quat::from_rotation_y(self.angle + std::f32::consts::FRAC_PI_2);
        self.transform = Transform::at(position).with_rotation(heading);
    }
}

impl CombatTarget for OrbitingTarget {
    fn current_target_transform(&self) -> Option<Transform> {
        Some(self.transform)
    }

    fn take_damage(&mut self, amount: f32, source_position: Vec3, knockback_force: f32) {
        self.damage_taken += amount;
        self.hits_taken += 1;
        debug!(amount, ?source_position, knockback_force, "Target hit");
    }
}

// ============================================================================
// Obstacles
// ============================================================================

/// Line-of-sight blockers made of vertical cylinders.
#[derive(Debug, Clone, Default)]
pub struct PillarField {
    pillars: Vec<Pillar>,
}

impl PillarField {
    /// Creates a field from pillars.
    #[must_use]
    pub fn new(pillars: Vec<Pillar>) -> Self {
        Self { pillars }
    }
}

impl ObstructionQuery for PillarField {
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool {
        let a = flatten(from);
        let segment = flatten(to) - a;
        let length_sq = segment.length_squared();

        self.pillars.iter().any(|pillar| {
            let centre = flatten(pillar.position);
            let t = if length_sq > f32::EPSILON {
                ((centre - a).dot(segment) / length_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + segment * t;
            closest.distance_squared(centre) <= pillar.radius * pillar.radius
        })
    }
}

// ============================================================================
// Arena
// ============================================================================

/// End-of-run statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArenaSummary {
    /// Frames simulated
    pub frames: usize,
    /// Highest number of simultaneous token holders
    pub peak_attackers: usize,
    /// Swings that connected
    pub hits_landed: u32,
    /// Damage dealt to the target
    pub damage_dealt: f32,
    /// Tokens refused by the coordinator
    pub tokens_denied: u32,
    /// Behavioral state changes
    pub state_changes: u32,
    /// Flinch reactions
    pub flinches: u32,
    /// Knockback reactions
    pub knockbacks: u32,
    /// Knockdown reactions
    pub knockdowns: u32,
    /// Stuns applied
    pub stuns: u32,
    /// Agents defeated
    pub defeats: u32,
    /// Wave members reported destroyed
    pub destroyed: u32,
}

impl ArenaSummary {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::AttackLanded { damage, .. } => {
                self.hits_landed += 1;
                self.damage_dealt += damage;
            },
            CombatEvent::TokenDenied { .. } => self.tokens_denied += 1,
            CombatEvent::StateChanged { .. } => self.state_changes += 1,
            CombatEvent::ReactionStarted { kind, .. } => match kind {
                ReactionKind::Flinch => self.flinches += 1,
                ReactionKind::Knockback => self.knockbacks += 1,
                ReactionKind::Knockdown => self.knockdowns += 1,
            },
            CombatEvent::AgentStunned { .. } => self.stuns += 1,
            CombatEvent::AgentDefeated { .. } => self.defeats += 1,
            CombatEvent::AgentDestroyed { .. } => self.destroyed += 1,
            CombatEvent::AgentSpawned { .. }
            | CombatEvent::TokenGranted { .. }
            | CombatEvent::ReactionFinished { .. } => {},
        }
    }

    /// Logs the summary.
    pub fn log(&self) {
        info!(
            frames = self.frames,
            peak_attackers = self.peak_attackers,
            hits_landed = self.hits_landed,
            damage_dealt = self.damage_dealt,
            tokens_denied = self.tokens_denied,
            state_changes = self.state_changes,
            "Arena finished"
        );
        info!(
            flinches = self.flinches,
            knockbacks = self.knockbacks,
            knockdowns = self.knockdowns,
            stuns = self.stuns,
            defeats = self.defeats,
            destroyed = self.destroyed,
            "Reactions"
        );
    }
}

/// A running encounter.
pub struct Arena {
    config: ArenaConfig,
    target: Arc<Mutex<OrbitingTarget>>,
    coordinator: Arc<Mutex<CrowdCoordinator>>,
    agents: Vec<CombatAgent<ArenaNavigator>>,
    obstacles: PillarField,
    bus: EventBus,
    summary: ArenaSummary,
    time: f64,
    frame: usize,
}

impl Arena {
    /// Builds the arena and spawns every agent.
    #[must_use]
    pub fn new(mut config: ArenaConfig) -> Self {
        config.validate();

        let target = Arc::new(Mutex::new(OrbitingTarget::new(
            Vec3::ZERO,
            config.target_orbit_radius,
            config.target_orbit_speed,
        )));
        let coordinator = CrowdCoordinator::new(config.coordinator.clone())
            .with_target(target.clone())
            .shared();
        let bus = EventBus::new(config.agent_count * 64 + 1024);
        let tracker: Arc<dyn WaveTracker> = Arc::new(bus.sender());
        let reactions = Arc::new(config.resolve_reactions());

        let count = config.agent_count;
        let agents = (0..count)
            .map(|index| {
                let angle = std::f32::consts::TAU * index as f32 / count as f32;
                let spawn = Quat::from_rotation_y(angle) * (Vec3::Z * config.spawn_radius);
                let mut body = Transform::at(spawn);
                body.face_towards(Vec3::ZERO);

                let mut agent_config = config.agent.clone();
                if agent_config.patrol_waypoints.is_empty() {
                    let side = body.transform_point(Vec3::X * 2.0);
                    agent_config.patrol_waypoints = vec![spawn, side];
                }
                let elite = config.elite_every > 0 && (index + 1) % config.elite_every == 0;
                agent_config.wave = Some(WaveTag::new(config.wave_index, elite));

                let mut agent =
                    CombatAgent::new(agent_config, body, ArenaNavigator::new(spawn))
                        .with_target(target.clone())
                        .with_coordinator(coordinator.clone())
                        .with_reaction_profile(reactions.clone())
                        .with_wave_tracker(tracker.clone())
                        .with_events(bus.sender())
                        .with_seed(config.seed.wrapping_add(index as u64));
                agent.on_spawned();
                agent
            })
            .collect();

        let obstacles = PillarField::new(config.pillars.clone());
        info!(agents = count, "Arena ready");

        Self {
            config,
            target,
            coordinator,
            agents,
            obstacles,
            bus,
            summary: ArenaSummary::default(),
            time: 0.0,
            frame: 0,
        }
    }

    /// Advances the whole arena by one frame.
    pub fn step(&mut self) {
        let dt = self.config.frame_dt;
        self.apply_schedule(dt);

        self.target.lock().advance(dt);

        let ctx = FrameContext::new(self.time, dt).with_obstruction(&self.obstacles);
        for agent in &mut self.agents {
            agent.update(&ctx);
            let (navigator, body) = agent.nav_body_mut();
            navigator.advance(body, dt);
        }

        let attackers = self.agents.iter().filter(|agent| agent.has_token()).count();
        if attackers > self.config.coordinator.max_active_attackers {
            warn!(attackers, "More attackers than the coordinator allows");
        }
        self.summary.peak_attackers = self.summary.peak_attackers.max(attackers);

        for event in self.bus.drain() {
            self.summary.record(&event);
        }

        self.time += f64::from(dt);
        self.frame += 1;
        self.log_progress();
    }

    /// Runs for the configured duration, despawns every agent and returns the summary.
    pub fn run(mut self) -> ArenaSummary {
        for _ in 0..self.config.frame_count() {
            self.step();
        }
        self.finish()
    }

    fn finish(mut self) -> ArenaSummary {
        for agent in &mut self.agents {
            agent.on_despawned();
        }
        for event in self.bus.drain() {
            self.summary.record(&event);
        }

        self.summary.frames = self.frame;
        {
            let target = self.target.lock();
            info!(
                hits = target.hits_taken,
                damage = target.damage_taken,
                "Target totals"
            );
        }
        let coordinator_peak = self.coordinator.lock().peak_active();
        self.summary.peak_attackers = self.summary.peak_attackers.max(coordinator_peak);
        self.summary.clone()
    }

    fn apply_schedule(&mut self, dt: f32) {
        let now = self.time;
        let next = self.time + f64::from(dt);
        let due = |at: f32| {
            let at = f64::from(at);
            at >= now && at < next
        };
        let source = self.target.lock().position();

        for hit in &self.config.hits {
            if !due(hit.time) {
                continue;
            }
            if let Some(agent) = self.agents.get_mut(hit.agent) {
                let kind = agent.receive_hit(hit.damage, source, hit.force);
                info!(agent = %agent.id(), ?kind, "Scheduled hit");
            }
        }

        for stun in &self.config.stuns {
            if !due(stun.time) {
                continue;
            }
            if let Some(agent) = self.agents.get_mut(stun.agent) {
                agent.apply_stun(stun.duration);
                info!(agent = %agent.id(), duration = stun.duration, "Scheduled stun");
            }
        }

        for window in &self.config.suppressions {
            let Some(agent) = self.agents.get_mut(window.agent) else {
                continue;
            };
            if due(window.start) {
                agent.set_suppressed(true);
                info!(agent = %agent.id(), "Suppression started");
            }
            if due(window.end) {
                agent.set_suppressed(false);
                info!(agent = %agent.id(), "Suppression ended");
            }
        }
    }

    fn log_progress(&self) {
        let interval = self.config.log_interval;
        if interval <= 0.0 {
            return;
        }
        let dt = f64::from(self.config.frame_dt);
        let interval = f64::from(interval);
        if (self.time % interval) >= dt {
            return;
        }

        let count = |state: AgentState| {
            self.agents
                .iter()
                .filter(|agent| agent.state() == state)
                .count()
        };
        info!(
            time = self.time,
            patrol = count(AgentState::Patrol),
            chase = count(AgentState::Chase),
            circle = count(AgentState::Circle),
            attack = count(AgentState::Attack),
            attackers = self.coordinator.lock().active_count(),
            "Arena progress"
        );
    }
}
