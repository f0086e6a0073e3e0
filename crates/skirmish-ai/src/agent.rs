//! Per-agent combat state machine.
//!
//! A [`CombatAgent`] perceives its single target on a throttled,
//! distance-adaptive decision tick, picks one of four behavioral states and
//! issues movement, rotation and animation commands every frame. Melee
//! swings, stuns and hit reactions are resumable timers advanced by the
//! frame delta.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Sender;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::{angle_between_deg, flatten, AgentId, Transform};
use tracing::{debug, info, trace};

use crate::collaborators::{
    anim, Animator, Navigator, ObstructionQuery, Poolable, SharedTarget, WaveTracker,
};
use crate::config::AgentConfig;
use crate::coordinator::SharedArbiter;
use crate::events::{self, CombatEvent};
use crate::hit_reaction::{HitReactionEngine, ReactionStatus};
use crate::melee::MeleeSwing;
use crate::profile::{ReactionKind, ReactionProfile};

// ============================================================================
// State
// ============================================================================

/// Behavioral state of a combat agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    /// Walking the patrol route.
    #[default]
    Patrol,
    /// Running at the target.
    Chase,
    /// Waiting on the ring for an attack token.
    Circle,
    /// Holding a token and swinging.
    Attack,
}

impl AgentState {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Chase => "chase",
            Self::Circle => "circle",
            Self::Attack => "attack",
        }
    }

    /// Whether the agent is engaged with its target.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        !matches!(self, Self::Patrol)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-frame inputs shared by every agent in one update pass.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Absolute time of this frame (seconds).
    pub time: f64,
    /// Time since the previous frame (seconds).
    pub dt: f32,
    /// Line-of-sight query, if level geometry is available.
    pub obstruction: Option<&'a dyn ObstructionQuery>,
}

impl<'a> FrameContext<'a> {
    /// Creates a frame context without an obstruction query.
    #[must_use]
    pub fn new(time: f64, dt: f32) -> Self {
        Self {
            time,
            dt,
            obstruction: None,
        }
    }

    /// Sets the obstruction query.
    #[must_use]
    pub fn with_obstruction(mut self, obstruction: &'a dyn ObstructionQuery) -> Self {
        self.obstruction = Some(obstruction);
        self
    }
}

/// Result of one perception pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Perception {
    distance: Option<f32>,
    visible: bool,
}

// ============================================================================
// Agent
// ============================================================================

/// A hostile agent fighting one target.
pub struct CombatAgent<N: Navigator> {
    id: AgentId,
    config: AgentConfig,
    transform: Transform,
    navigator: N,
    animator: Animator,
    target: Option<SharedTarget>,
    coordinator: Option<SharedArbiter>,
    reaction: HitReactionEngine,
    wave_tracker: Option<Arc<dyn WaveTracker>>,
    events: Option<Sender<CombatEvent>>,
    rng: fastrand::Rng,

    state: AgentState,
    health: f32,
    defeated: bool,
    suppressed: bool,
    stun_timer: f32,
    swing: MeleeSwing,
    has_token: bool,
    cooldown_timer: f32,
    next_decision_time: f64,
    next_anim_time: f64,
    patrol_index: usize,
    patrol_wait_timer: f32,
    patrol_route_dirty: bool,
    target_visible: bool,
    target_distance: Option<f32>,
    destroyed_reported: bool,
}

impl<N: Navigator> fmt::Debug for CombatAgent<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatAgent")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("position", &self.transform.position)
            .field("health", &self.health)
            .field("defeated", &self.defeated)
            .field("suppressed", &self.suppressed)
            .field("stun_timer", &self.stun_timer)
            .field("has_token", &self.has_token)
            .field("attacking", &self.swing.is_attacking())
            .field("reacting", &self.reaction.is_reacting())
            .finish_non_exhaustive()
    }
}

impl<N: Navigator> CombatAgent<N> {
    /// Creates an agent in the patrol baseline.
    #[must_use]
    pub fn new(mut config: AgentConfig, transform: Transform, navigator: N) -> Self {
        config.validate();
        let swing = MeleeSwing::new(config.melee);
        let health = config.max_health;
        Self {
            id: AgentId::new(),
            config,
            transform,
            navigator,
            animator: Animator::unbound(),
            target: None,
            coordinator: None,
            reaction: HitReactionEngine::new(),
            wave_tracker: None,
            events: None,
            rng: fastrand::Rng::new(),
            state: AgentState::Patrol,
            health,
            defeated: false,
            suppressed: false,
            stun_timer: 0.0,
            swing,
            has_token: false,
            cooldown_timer: 0.0,
            next_decision_time: 0.0,
            next_anim_time: 0.0,
            patrol_index: 0,
            patrol_wait_timer: 0.0,
            patrol_route_dirty: true,
            target_visible: false,
            target_distance: None,
            destroyed_reported: false,
        }
    }

    /// Sets the tracked target.
    #[must_use]
    pub fn with_target(mut self, target: SharedTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Registers with a shared coordinator.
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: SharedArbiter) -> Self {
        coordinator.lock().register(self.id);
        self.coordinator = Some(coordinator);
        self
    }

    /// Binds an animation controller.
    #[must_use]
    pub fn with_animator(mut self, animator: Animator) -> Self {
        self.animator = animator;
        self
    }

    /// Uses a shared reaction profile.
    #[must_use]
    pub fn with_reaction_profile(mut self, profile: Arc<ReactionProfile>) -> Self {
        self.reaction = HitReactionEngine::new().with_profile(profile);
        self
    }

    /// Sets the wave tracker notified on destruction.
    #[must_use]
    pub fn with_wave_tracker(mut self, tracker: Arc<dyn WaveTracker>) -> Self {
        self.wave_tracker = Some(tracker);
        self
    }

    /// Publishes combat events to a bus.
    #[must_use]
    pub fn with_events(mut self, sender: Sender<CombatEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Seeds the jitter and random patrol generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Agent ID.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current pose.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Navigator.
    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Navigator and pose together, for hosts that integrate movement.
    pub fn nav_body_mut(&mut self) -> (&mut N, &mut Transform) {
        (&mut self.navigator, &mut self.transform)
    }

    /// Hit reaction engine.
    #[must_use]
    pub fn reaction(&self) -> &HitReactionEngine {
        &self.reaction
    }

    /// Current behavioral state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether the agent has been defeated.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Whether autonomy is externally suppressed.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Whether a stun is running.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    /// Stun time left.
    #[must_use]
    pub fn stun_remaining(&self) -> f32 {
        self.stun_timer
    }

    /// Whether the agent holds an attack token.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.has_token
    }

    /// Whether a melee swing is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.swing.is_attacking()
    }

    /// Whether a hit reaction is running.
    #[must_use]
    pub fn is_reacting(&self) -> bool {
        self.reaction.is_reacting()
    }

    /// Attack cooldown left.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_timer
    }

    /// Time of the next decision tick.
    #[must_use]
    pub fn next_decision_time(&self) -> f64 {
        self.next_decision_time
    }

    /// Visibility from the last decision tick.
    #[must_use]
    pub fn target_visible(&self) -> bool {
        self.target_visible
    }

    /// Target distance from the last decision tick.
    #[must_use]
    pub fn target_distance(&self) -> Option<f32> {
        self.target_distance
    }

    /// Index of the current patrol waypoint.
    #[must_use]
    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    // ------------------------------------------------------------------------
    // Frame update
    // ------------------------------------------------------------------------

    /// Advances the agent by one frame.
    pub fn update(&mut self, ctx: &FrameContext<'_>) {
        if self.defeated {
            return;
        }

        // The stun clock runs even while a reaction holds the agent.
        let stunned = self.tick_stun(ctx.dt);

        match self
            .reaction
            .tick(ctx.dt, &mut self.transform, &mut self.navigator)
        {
            ReactionStatus::Running => return,
            ReactionStatus::Finished(kind) => {
                if self.suppressed || self.is_stunned() {
                    self.navigator.set_stopped(true);
                }
                self.emit(CombatEvent::ReactionFinished {
                    agent: self.id,
                    kind,
                });
            },
            ReactionStatus::Idle => {},
        }

        if stunned {
            self.push_animation(ctx.time);
            return;
        }

        if self.suppressed {
            return;
        }

        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - ctx.dt).max(0.0);
        }
        if self.state == AgentState::Attack
            && self.swing.is_attacking()
            && !self.token_still_held()
        {
            self.swing.cancel();
            self.has_token = false;
            debug!(agent = %self.id, "Token revoked, swing cancelled");
        }
        self.advance_swing(ctx.dt);

        if ctx.time >= self.next_decision_time {
            self.decide(ctx);
            let interval = self
                .config
                .decision_interval(self.target_distance, &mut self.rng);
            self.next_decision_time = ctx.time + f64::from(interval);
            trace!(agent = %self.id, interval, "Next decision scheduled");
        }

        self.run_state(ctx.dt);
        self.push_animation(ctx.time);
    }

    /// Counts a running stun down. Returns whether one was running when the frame began.
    fn tick_stun(&mut self, dt: f32) -> bool {
        if self.stun_timer <= 0.0 {
            return false;
        }
        self.stun_timer -= dt;
        if self.stun_timer <= 0.0 {
            self.stun_timer = 0.0;
            self.animator.flag(anim::STUNNED, false);
            // A running reaction hands navigation back when it ends.
            if !self.suppressed && !self.reaction.is_reacting() {
                self.navigator.set_stopped(false);
            }
            debug!(agent = %self.id, "Stun expired");
        }
        true
    }

    fn advance_swing(&mut self, dt: f32) {
        let step = self.swing.advance(dt);
        if step.hit_now {
            self.apply_melee_hit();
        }
        if step.finished {
            self.release_token();
            trace!(agent = %self.id, "Swing finished");
        }
    }

    fn push_animation(&mut self, time: f64) {
        if time < self.next_anim_time {
            return;
        }
        self.animator
            .float(anim::SPEED, self.navigator.velocity().length());
        self.animator.flag(anim::IN_COMBAT, self.state.is_engaged());
        self.next_anim_time = time + f64::from(self.config.anim_interval(self.target_distance));
    }

    // ------------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------------

    fn target_pose(&self) -> Option<Transform> {
        self.target
            .as_ref()
            .and_then(|target| target.lock().current_target_transform())
    }

    fn perceive(&self, obstruction: Option<&dyn ObstructionQuery>) -> Perception {
        let Some(pose) = self.target_pose() else {
            return Perception {
                distance: None,
                visible: false,
            };
        };

        let to_target = pose.position - self.transform.position;
        let distance = to_target.length();
        let visible = distance <= self.config.detection_radius
            && angle_between_deg(self.transform.flat_forward(), flatten(to_target))
                <= self.config.fov_half_angle
            && !obstruction.is_some_and(|query| {
                let eye = self.transform.position + Vec3::Y * self.config.eye_height;
                query.is_obstructed(eye, pose.position)
            });

        Perception {
            distance: Some(distance),
            visible,
        }
    }

    fn decide(&mut self, ctx: &FrameContext<'_>) {
        let perception = self.perceive(ctx.obstruction);
        self.target_visible = perception.visible;
        self.target_distance = perception.distance;

        let distance = perception.distance.unwrap_or(f32::INFINITY);
        let in_range = perception.visible && distance <= self.config.attack_radius;
        if !in_range && self.has_token {
            self.release_token();
        }

        let next = if !perception.visible {
            AgentState::Patrol
        } else if in_range {
            if self.acquire_token() {
                AgentState::Attack
            } else {
                AgentState::Circle
            }
        } else if distance <= self.config.circle_engage_range && !self.token_available() {
            AgentState::Circle
        } else {
            AgentState::Chase
        };

        self.transition_to(next);
    }

    fn transition_to(&mut self, next: AgentState) {
        if next == self.state {
            return;
        }
        let from = self.state;
        if from == AgentState::Attack {
            self.swing.cancel();
            self.release_token();
        }
        if next == AgentState::Patrol {
            self.patrol_wait_timer = 0.0;
            self.patrol_route_dirty = true;
        }
        self.state = next;
        debug!(agent = %self.id, %from, to = %next, "State changed");
        self.emit(CombatEvent::StateChanged {
            agent: self.id,
            from,
            to: next,
        });
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn acquire_token(&mut self) -> bool {
        let Some(coordinator) = self.coordinator.as_ref() else {
            self.has_token = true;
            return true;
        };

        let granted = coordinator.lock().request_token(self.id);
        if granted && !self.has_token {
            self.emit(CombatEvent::TokenGranted { agent: self.id });
        } else if !granted && self.state != AgentState::Circle {
            debug!(agent = %self.id, "Attack token denied");
            self.emit(CombatEvent::TokenDenied { agent: self.id });
        }
        self.has_token = granted;
        granted
    }

    fn token_available(&self) -> bool {
        self.coordinator
            .as_ref()
            .map_or(true, |coordinator| coordinator.lock().has_free_token(self.id))
    }

    fn token_still_held(&self) -> bool {
        self.has_token
            && self
                .coordinator
                .as_ref()
                .map_or(true, |coordinator| coordinator.lock().holds_token(self.id))
    }

    fn release_token(&mut self) {
        if let Some(coordinator) = self.coordinator.as_ref() {
            coordinator.lock().release_token(self.id);
        }
        self.has_token = false;
    }

    /// Unregisters from the coordinator and stops using it.
    ///
    /// Circling then falls back to a point behind the agent's facing.
    pub fn detach_coordinator(&mut self) {
        if let Some(coordinator) = self.coordinator.take() {
            let mut coordinator = coordinator.lock();
            coordinator.release_token(self.id);
            coordinator.unregister(self.id);
        }
        self.has_token = false;
    }

    // ------------------------------------------------------------------------
    // State behaviors
    // ------------------------------------------------------------------------

    fn run_state(&mut self, dt: f32) {
        match self.state {
            AgentState::Patrol => self.patrol(dt),
            AgentState::Chase => self.chase(dt),
            AgentState::Circle => self.circle(dt),
            AgentState::Attack => self.attack(dt),
        }
    }

    fn patrol(&mut self, dt: f32) {
        let count = self.config.patrol_waypoints.len();
        let Some(waypoint) = self.config.patrol_waypoints.get(self.patrol_index).copied() else {
            self.patrol_index = 0;
            return;
        };

        self.navigator.set_stopped(false);
        self.navigator.set_speed(self.config.patrol_speed);
        if self.patrol_route_dirty {
            self.navigator.set_destination(waypoint);
            self.patrol_route_dirty = false;
        }

        if self.navigator.remaining_distance() > self.config.waypoint_tolerance {
            return;
        }

        self.patrol_wait_timer += dt;
        if self.patrol_wait_timer >= self.config.patrol_wait {
            self.patrol_wait_timer = 0.0;
            self.patrol_index = if self.config.random_patrol {
                self.rng.usize(0..count)
            } else {
                (self.patrol_index + 1) % count
            };
            self.patrol_route_dirty = true;
            trace!(agent = %self.id, index = self.patrol_index, "Next waypoint");
        }
    }

    fn chase(&mut self, dt: f32) {
        let Some(pose) = self.target_pose() else {
            return;
        };
        self.navigator.set_stopped(false);
        self.navigator.set_speed(self.config.chase_speed);
        self.navigator.set_destination(pose.position);
        self.turn_towards(pose.position, dt);
    }

    fn circle(&mut self, dt: f32) {
        let Some(pose) = self.target_pose() else {
            return;
        };

        let destination = match self.coordinator.as_ref() {
            Some(coordinator) => coordinator
                .lock()
                .ring_position(self.id, self.transform.position),
            None => {
                pose.position
                    - self.transform.flat_forward() * self.config.fallback_circle_distance
            },
        };

        self.navigator.set_stopped(false);
        self.navigator
            .set_speed(self.config.chase_speed * self.config.circle_speed_factor);
        self.navigator.set_destination(destination);
        self.turn_towards(pose.position, dt);
    }

    fn attack(&mut self, dt: f32) {
        if !self.token_still_held() {
            self.has_token = false;
            self.transition_to(AgentState::Circle);
            self.circle(dt);
            return;
        }

        self.navigator.set_stopped(true);
        if let Some(pose) = self.target_pose() {
            self.turn_towards(pose.position, dt);
        }

        if !self.swing.is_attacking() && self.cooldown_timer <= 0.0 {
            self.swing.start();
            self.animator.trigger(anim::ATTACK);
            self.cooldown_timer = self.config.attack_cooldown;
            debug!(agent = %self.id, "Swing started");
        }
    }

    fn turn_towards(&mut self, point: Vec3, dt: f32) {
        self.transform
            .turn_towards(point, self.config.rotation_speed * dt);
    }

    fn apply_melee_hit(&mut self) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let mut target = target.lock();
        let Some(pose) = target.current_target_transform() else {
            return;
        };

        let origin = self
            .config
            .attack_origin
            .map_or(self.transform.position, |offset| {
                self.transform.transform_point(offset)
            });
        let to_target = pose.position - origin;
        let distance = to_target.length();
        let angle = angle_between_deg(self.transform.flat_forward(), flatten(to_target));

        if distance <= self.config.hit_radius && angle <= self.config.hit_angle * 0.5 {
            target.take_damage(
                self.config.attack_damage,
                self.transform.position,
                self.config.knockback_force,
            );
            drop(target);
            debug!(agent = %self.id, damage = self.config.attack_damage, "Melee hit landed");
            self.emit(CombatEvent::AttackLanded {
                agent: self.id,
                damage: self.config.attack_damage,
            });
        } else {
            trace!(agent = %self.id, distance, angle, "Melee swing missed");
        }
    }

    // ------------------------------------------------------------------------
    // External control
    // ------------------------------------------------------------------------

    /// Freezes or releases the agent's autonomy.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        if suppressed {
            self.suppressed = true;
            self.swing.cancel();
            self.release_token();
            self.navigator.set_stopped(true);
            debug!(agent = %self.id, "Suppressed");
        } else {
            self.suppressed = false;
            if !self.is_stunned() && !self.defeated && !self.reaction.is_reacting() {
                self.navigator.set_stopped(false);
            }
            debug!(agent = %self.id, "Suppression lifted");
        }
    }

    /// Stuns the agent for at least `duration` seconds.
    ///
    /// A shorter stun never cuts a longer running one short.
    pub fn apply_stun(&mut self, duration: f32) {
        if self.defeated || duration.is_nan() || duration <= 0.0 {
            return;
        }

        self.stun_timer = self.stun_timer.max(duration);
        self.navigator.set_stopped(true);
        self.swing.cancel();
        self.release_token();
        self.animator.trigger(anim::HIT);
        self.animator.flag(anim::STUNNED, true);

        debug!(agent = %self.id, remaining = self.stun_timer, "Stunned");
        self.emit(CombatEvent::AgentStunned {
            agent: self.id,
            remaining: self.stun_timer,
        });
    }

    /// Applies damage from `source` with an impact `force`.
    ///
    /// Returns the reaction played, or `None` if the hit defeated the agent
    /// or the agent was already defeated.
    pub fn receive_hit(&mut self, amount: f32, source: Vec3, force: f32) -> Option<ReactionKind> {
        if self.defeated {
            return None;
        }

        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            self.defeat();
            return None;
        }

        self.swing.cancel();
        self.release_token();
        let kind = self.reaction.apply_hit(
            source,
            force,
            &self.transform,
            &mut self.navigator,
            &mut self.animator,
        );
        self.emit(CombatEvent::ReactionStarted {
            agent: self.id,
            kind,
        });
        Some(kind)
    }

    /// Disables autonomy for good. The agent stays in place until despawned.
    pub fn defeat(&mut self) {
        if self.defeated {
            return;
        }
        self.defeated = true;
        self.health = 0.0;

        self.reaction
            .cancel_reaction(&self.transform, &mut self.navigator);
        self.swing.cancel();
        self.release_token();
        self.stun_timer = 0.0;
        self.navigator.set_stopped(true);
        self.animator.trigger(anim::DIE);

        info!(agent = %self.id, "Agent defeated");
        self.emit(CombatEvent::AgentDefeated { agent: self.id });
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Resets every transient field to the patrol baseline.
    pub fn on_spawned(&mut self) {
        self.reaction
            .cancel_reaction(&self.transform, &mut self.navigator);
        self.reaction.on_acquire();
        self.release_token();

        self.state = AgentState::Patrol;
        self.health = self.config.max_health;
        self.defeated = false;
        self.suppressed = false;
        self.stun_timer = 0.0;
        self.swing = MeleeSwing::new(self.config.melee);
        self.cooldown_timer = 0.0;
        self.next_decision_time = 0.0;
        self.next_anim_time = 0.0;
        self.patrol_index = 0;
        self.patrol_wait_timer = 0.0;
        self.patrol_route_dirty = true;
        self.target_visible = false;
        self.target_distance = None;
        self.destroyed_reported = false;

        self.navigator.set_authority(true, true);
        self.navigator.set_stopped(false);
        if let Some(coordinator) = self.coordinator.as_ref() {
            coordinator.lock().register(self.id);
        }

        info!(agent = %self.id, "Agent spawned");
        self.emit(CombatEvent::AgentSpawned { agent: self.id });
    }

    /// Releases shared resources when the agent goes back to its pool.
    ///
    /// Configuration is left untouched for reuse.
    pub fn on_despawned(&mut self) {
        self.swing.cancel();
        self.release_token();
        self.suppressed = false;
        self.reaction.on_release();
        if let Some(coordinator) = self.coordinator.as_ref() {
            coordinator.lock().unregister(self.id);
        }
        self.report_destroyed();
        info!(agent = %self.id, "Agent despawned");
    }

    /// Tells the wave tracker this agent is gone. Only the first call per life counts.
    pub fn report_destroyed(&mut self) {
        if self.destroyed_reported {
            return;
        }
        self.destroyed_reported = true;

        if let (Some(tracker), Some(wave)) = (self.wave_tracker.as_ref(), self.config.wave) {
            tracker.notify_destroyed(wave.wave_index, wave.is_elite);
        }
    }

    fn emit(&self, event: CombatEvent) {
        if let Some(sender) = self.events.as_ref() {
            events::publish(sender, event);
        }
    }
}

impl<N: Navigator> Poolable for CombatAgent<N> {
    fn on_acquire(&mut self) {
        self.on_spawned();
    }

    fn on_release(&mut self) {
        self.on_despawned();
    }
}

impl<N: Navigator> Drop for CombatAgent<N> {
    fn drop(&mut self) {
        if let Some(coordinator) = self.coordinator.as_ref() {
            coordinator.lock().unregister(self.id);
        }
        self.report_destroyed();
    }
}
