//! Combat agent tunables.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::{inverse_lerp_clamped, WaveTag};
use tracing::warn;

use crate::melee::MeleeTiming;

/// Hard floor for the decision interval (seconds).
pub const MIN_DECISION_INTERVAL: f32 = 0.02;

/// Per-agent configuration.
///
/// Every field has a default, so a config file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // Perception
    /// Maximum distance at which the target can be noticed.
    pub detection_radius: f32,
    /// Distance at which the agent tries to attack.
    pub attack_radius: f32,
    /// Half of the field-of-view cone (degrees).
    pub fov_half_angle: f32,
    /// Height of the line-of-sight origin above the agent's position.
    pub eye_height: f32,

    // Movement
    /// Speed while patrolling.
    pub patrol_speed: f32,
    /// Speed while chasing.
    pub chase_speed: f32,
    /// Turn rate used while chasing and attacking.
    pub rotation_speed: f32,
    /// Fraction of chase speed used while circling.
    pub circle_speed_factor: f32,
    /// Beyond the attack radius but within this range, a visible agent waits
    /// on the ring instead of chasing when no token is free.
    pub circle_engage_range: f32,
    /// Offset from the target used as a circling point without a coordinator.
    pub fallback_circle_distance: f32,

    // Melee
    /// Swing timing.
    pub melee: MeleeTiming,
    /// Reach of a swing from the attack origin.
    pub hit_radius: f32,
    /// Full angular width of a swing (degrees).
    pub hit_angle: f32,
    /// Damage per landed swing.
    pub attack_damage: f32,
    /// Knockback force passed to the target.
    pub knockback_force: f32,
    /// Minimum time between swing starts (seconds).
    pub attack_cooldown: f32,
    /// Local-space offset of the swing origin, if not the agent's own position.
    pub attack_origin: Option<Vec3>,

    // Patrol
    /// Patrol route.
    pub patrol_waypoints: Vec<Vec3>,
    /// Pick the next waypoint uniformly at random instead of in order.
    pub random_patrol: bool,
    /// Time spent at each waypoint (seconds).
    pub patrol_wait: f32,
    /// Remaining path distance that counts as arrived.
    pub waypoint_tolerance: f32,

    // Adaptive update rate
    /// Target distance at or below which the near interval applies.
    pub near_distance: f32,
    /// Target distance at or above which the far interval applies.
    pub far_distance: f32,
    /// Decision interval near the target (seconds).
    pub near_interval: f32,
    /// Decision interval far from the target (seconds).
    pub far_interval: f32,
    /// Random jitter added to each decision interval (seconds, +/-).
    pub decision_jitter: f32,
    /// Animation push interval within the far distance (seconds).
    pub anim_interval_near: f32,
    /// Animation push interval beyond the far distance (seconds).
    pub anim_interval_far: f32,

    // Lifecycle
    /// Health at spawn.
    pub max_health: f32,
    /// Wave membership reported on destruction.
    pub wave: Option<WaveTag>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_radius: 15.0,
            attack_radius: 2.0,
            fov_half_angle: 60.0,
            eye_height: 1.6,

            patrol_speed: 2.0,
            chase_speed: 4.5,
            rotation_speed: 8.0,
            circle_speed_factor: 0.85,
            circle_engage_range: 6.0,
            fallback_circle_distance: 3.0,

            melee: MeleeTiming::default(),
            hit_radius: 2.2,
            hit_angle: 90.0,
            attack_damage: 10.0,
            knockback_force: 3.0,
            attack_cooldown: 1.5,
            attack_origin: None,

            patrol_waypoints: Vec::new(),
            random_patrol: false,
            patrol_wait: 1.5,
            waypoint_tolerance: 0.5,

            near_distance: 10.0,
            far_distance: 40.0,
            near_interval: 0.1,
            far_interval: 0.6,
            decision_jitter: 0.05,
            anim_interval_near: 0.05,
            anim_interval_far: 0.25,

            max_health: 100.0,
            wave: None,
        }
    }
}

impl AgentConfig {
    /// Sets the detection and attack radii.
    #[must_use]
    pub fn with_ranges(mut self, detection: f32, attack: f32) -> Self {
        self.detection_radius = detection;
        self.attack_radius = attack;
        self
    }

    /// Sets the melee timing.
    #[must_use]
    pub fn with_melee(mut self, timing: MeleeTiming) -> Self {
        self.melee = timing;
        self
    }

    /// Sets the patrol route.
    #[must_use]
    pub fn with_waypoints(mut self, waypoints: Vec<Vec3>) -> Self {
        self.patrol_waypoints = waypoints;
        self
    }

    /// Sets the wave membership.
    #[must_use]
    pub fn with_wave(mut self, wave: WaveTag) -> Self {
        self.wave = Some(wave);
        self
    }

    /// Validates and clamps values to sane ranges.
    pub fn validate(&mut self) {
        self.detection_radius = self.detection_radius.max(0.0);
        self.attack_radius = self.attack_radius.clamp(0.0, self.detection_radius);
        self.fov_half_angle = self.fov_half_angle.clamp(0.0, 180.0);

        self.patrol_speed = self.patrol_speed.max(0.0);
        self.chase_speed = self.chase_speed.max(0.0);
        self.rotation_speed = self.rotation_speed.max(0.0);
        self.circle_speed_factor = self.circle_speed_factor.clamp(0.0, 1.0);
        self.circle_engage_range = self.circle_engage_range.max(self.attack_radius);

        self.melee = MeleeTiming::new(self.melee.windup, self.melee.active, self.melee.recovery);
        self.hit_radius = self.hit_radius.max(0.0);
        self.hit_angle = self.hit_angle.clamp(0.0, 360.0);
        self.attack_cooldown = self.attack_cooldown.max(0.0);

        self.patrol_wait = self.patrol_wait.max(0.0);
        self.waypoint_tolerance = self.waypoint_tolerance.max(0.0);

        if self.far_distance < self.near_distance {
            warn!(
                near = self.near_distance,
                far = self.far_distance,
                "Far distance below near distance, swapping"
            );
            std::mem::swap(&mut self.near_distance, &mut self.far_distance);
        }
        self.near_interval = self.near_interval.max(MIN_DECISION_INTERVAL);
        self.far_interval = self.far_interval.max(MIN_DECISION_INTERVAL);
        self.decision_jitter = self.decision_jitter.max(0.0);
        self.anim_interval_near = self.anim_interval_near.max(0.0);
        self.anim_interval_far = self.anim_interval_far.max(self.anim_interval_near);

        self.max_health = self.max_health.max(1.0);
    }

    /// Base decision interval for a target distance, before jitter.
    ///
    /// With no known distance the agent is treated as far away.
    #[must_use]
    pub fn base_decision_interval(&self, distance: Option<f32>) -> f32 {
        let t = distance.map_or(1.0, |d| {
            inverse_lerp_clamped(self.near_distance, self.far_distance, d)
        });
        self.near_interval + (self.far_interval - self.near_interval) * t
    }

    /// Decision interval with jitter, never below [`MIN_DECISION_INTERVAL`].
    pub fn decision_interval(&self, distance: Option<f32>, rng: &mut fastrand::Rng) -> f32 {
        let jitter = if self.decision_jitter > 0.0 {
            (rng.f32() * 2.0 - 1.0) * self.decision_jitter
        } else {
            0.0
        };
        (self.base_decision_interval(distance) + jitter).max(MIN_DECISION_INTERVAL)
    }

    /// Animation push interval for a target distance.
    #[must_use]
    pub fn anim_interval(&self, distance: Option<f32>) -> f32 {
        match distance {
            Some(d) if d <= self.far_distance => self.anim_interval_near,
            _ => self.anim_interval_far,
        }
    }
}
