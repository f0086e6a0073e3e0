//! Interfaces to the systems a combat agent depends on but does not own.
//!
//! Navigation, animation playback, the tracked target, line-of-sight queries
//! and wave bookkeeping all live outside this crate. Mock implementations are
//! provided for tests and headless tools.

use glam::Vec3;
use parking_lot::Mutex;
use skirmish_common::{Transform, WaveTag};
use std::fmt;
use std::sync::Arc;

/// Path-following movement for one agent.
pub trait Navigator {
    /// Sets the movement speed.
    fn set_speed(&mut self, speed: f32);
    /// Sets the destination to path towards.
    fn set_destination(&mut self, destination: Vec3);
    /// Stops or resumes path following.
    fn set_stopped(&mut self, stopped: bool);
    /// Remaining distance along the current path.
    fn remaining_distance(&self) -> f32;
    /// Current velocity.
    fn velocity(&self) -> Vec3;
    /// Teleports the internal navigation position.
    fn warp_to(&mut self, position: Vec3);
    /// Grants or revokes authority over the agent's position and rotation.
    fn set_authority(&mut self, update_position: bool, update_rotation: bool);
}

/// Receiver of animation controller parameters.
pub trait AnimationSink: Send {
    /// Fires a trigger parameter.
    fn set_trigger(&mut self, name: &str);
    /// Sets a float parameter.
    fn set_float(&mut self, name: &str, value: f32);
    /// Sets a bool parameter.
    fn set_bool(&mut self, name: &str, value: bool);
}

/// The single target an agent tracks and damages.
pub trait CombatTarget: Send {
    /// Current pose of the target, or `None` while it cannot be resolved.
    fn current_target_transform(&self) -> Option<Transform>;
    /// Applies melee damage to the target.
    fn take_damage(&mut self, amount: f32, source_position: Vec3, knockback_force: f32);
}

/// Line-of-sight query against level geometry.
pub trait ObstructionQuery {
    /// Returns true if geometry blocks the segment from `from` to `to`.
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool;
}

/// Receives a notification when a wave member goes away.
pub trait WaveTracker: Send + Sync {
    /// Called once per agent when its owning object is disabled or destroyed.
    fn notify_destroyed(&self, wave_index: u32, is_elite: bool);
}

/// Spawn-cycle reset hook for pooled components.
pub trait Poolable {
    /// Called when the object is taken from the pool.
    fn on_acquire(&mut self);
    /// Called when the object is returned to the pool.
    fn on_release(&mut self);
}

/// Shared handle to the tracked target.
pub type SharedTarget = Arc<Mutex<dyn CombatTarget>>;

/// Animation parameter names pushed by the combat core.
pub mod anim {
    /// Trigger fired when a melee swing starts.
    pub const ATTACK: &str = "Attack";
    /// Trigger fired when a stun lands.
    pub const HIT: &str = "Hit";
    /// Trigger fired on defeat.
    pub const DIE: &str = "Die";
    /// Trigger for a flinch reaction.
    pub const FLINCH: &str = "Flinch";
    /// Trigger for a knockback reaction.
    pub const KNOCKBACK: &str = "Knockback";
    /// Trigger for a knockdown reaction.
    pub const KNOCKDOWN: &str = "Knockdown";
    /// Float: current movement speed.
    pub const SPEED: &str = "Speed";
    /// Bool: agent is engaged with its target.
    pub const IN_COMBAT: &str = "InCombat";
    /// Bool: agent is stunned.
    pub const STUNNED: &str = "Stunned";
}

/// Optional animation binding. Every call is a no-op while unbound.
#[derive(Default)]
pub struct Animator {
    sink: Option<Box<dyn AnimationSink>>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Animator {
    /// Creates an animator bound to a sink.
    #[must_use]
    pub fn bound(sink: Box<dyn AnimationSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates an animator with no controller.
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Whether a controller is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }

    /// Fires a trigger.
    pub fn trigger(&mut self, name: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_trigger(name);
        }
    }

    /// Sets a float parameter.
    pub fn float(&mut self, name: &str, value: f32) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_float(name, value);
        }
    }

    /// Sets a bool parameter.
    pub fn flag(&mut self, name: &str, value: bool) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_bool(name, value);
        }
    }
}

// ============================================================================
// Mocks
// ============================================================================

/// Observable state of a [`MockNavigator`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockNavState {
    /// Last speed set
    pub speed: f32,
    /// Last destination set
    pub destination: Option<Vec3>,
    /// Whether path following is stopped
    pub stopped: bool,
    /// Value reported by `remaining_distance`
    pub remaining: f32,
    /// Value reported by `velocity`
    pub velocity: Vec3,
    /// Last warp position
    pub warped_to: Option<Vec3>,
    /// Position authority
    pub update_position: bool,
    /// Rotation authority
    pub update_rotation: bool,
    /// Number of destinations issued
    pub destinations_issued: u32,
}

impl Default for MockNavState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            destination: None,
            stopped: false,
            remaining: f32::INFINITY,
            velocity: Vec3::ZERO,
            warped_to: None,
            update_position: true,
            update_rotation: true,
            destinations_issued: 0,
        }
    }
}

/// Mock navigator for testing. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockNavigator {
    state: Arc<Mutex<MockNavState>>,
}

impl MockNavigator {
    /// Creates a new mock navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MockNavState {
        self.state.lock().clone()
    }

    /// Sets the value reported by `remaining_distance`.
    pub fn set_remaining(&self, remaining: f32) {
        self.state.lock().remaining = remaining;
    }

    /// Sets the value reported by `velocity`.
    pub fn set_velocity(&self, velocity: Vec3) {
        self.state.lock().velocity = velocity;
    }

    /// Whether path following is stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    /// Last destination set.
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.state.lock().destination
    }
}

impl Navigator for MockNavigator {
    fn set_speed(&mut self, speed: f32) {
        self.state.lock().speed = speed;
    }

    fn set_destination(&mut self, destination: Vec3) {
        let mut state = self.state.lock();
        state.destination = Some(destination);
        state.destinations_issued += 1;
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.state.lock().stopped = stopped;
    }

    fn remaining_distance(&self) -> f32 {
        self.state.lock().remaining
    }

    fn velocity(&self) -> Vec3 {
        self.state.lock().velocity
    }

    fn warp_to(&mut self, position: Vec3) {
        self.state.lock().warped_to = Some(position);
    }

    fn set_authority(&mut self, update_position: bool, update_rotation: bool) {
        let mut state = self.state.lock();
        state.update_position = update_position;
        state.update_rotation = update_rotation;
    }
}

/// A call recorded by [`MockAnimator`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnimCall {
    /// `set_trigger`
    Trigger(String),
    /// `set_float`
    Float(String, f32),
    /// `set_bool`
    Bool(String, bool),
}

/// Mock animation sink that records every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MockAnimator {
    calls: Arc<Mutex<Vec<AnimCall>>>,
}

impl MockAnimator {
    /// Creates a new mock animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<AnimCall> {
        self.calls.lock().clone()
    }

    /// Recorded trigger names, in order.
    #[must_use]
    pub fn triggers(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                AnimCall::Trigger(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `set_float` calls for a parameter.
    #[must_use]
    pub fn float_pushes(&self, name: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, AnimCall::Float(n, _) if n == name))
            .count()
    }
}

impl AnimationSink for MockAnimator {
    fn set_trigger(&mut self, name: &str) {
        self.calls.lock().push(AnimCall::Trigger(name.to_string()));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.calls
            .lock()
            .push(AnimCall::Float(name.to_string(), value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.calls.lock().push(AnimCall::Bool(name.to_string(), value));
    }
}

/// A damage call recorded by [`MockTarget`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRecord {
    /// Damage amount
    pub amount: f32,
    /// Where the hit came from
    pub source_position: Vec3,
    /// Knockback force
    pub knockback_force: f32,
}

/// Mock target for testing.
#[derive(Debug, Clone, Default)]
pub struct MockTarget {
    /// Pose returned to agents (`None` = unresolved)
    pub transform: Option<Transform>,
    /// Damage received, in order
    pub damage_taken: Vec<DamageRecord>,
}

impl MockTarget {
    /// Creates a target at a position.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Some(Transform::at(position)),
            damage_taken: Vec::new(),
        }
    }

    /// Creates a target that cannot be resolved.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Wraps the target in a shared handle.
    #[must_use]
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// Moves the target.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform = Some(Transform::at(position));
    }

    /// Total damage received.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.damage_taken.iter().map(|record| record.amount).sum()
    }
}

impl CombatTarget for MockTarget {
    fn current_target_transform(&self) -> Option<Transform> {
        self.transform
    }

    fn take_damage(&mut self, amount: f32, source_position: Vec3, knockback_force: f32) {
        self.damage_taken.push(DamageRecord {
            amount,
            source_position,
            knockback_force,
        });
    }
}

/// Mock obstruction query for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockObstruction {
    /// Whether every segment is blocked
    pub blocked: bool,
}

impl MockObstruction {
    /// A world with nothing in the way.
    #[must_use]
    pub const fn clear() -> Self {
        Self { blocked: false }
    }

    /// A world where every line of sight is blocked.
    #[must_use]
    pub const fn walled() -> Self {
        Self { blocked: true }
    }
}

impl ObstructionQuery for MockObstruction {
    fn is_obstructed(&self, _from: Vec3, _to: Vec3) -> bool {
        self.blocked
    }
}

/// Wave tracker that records notifications.
#[derive(Debug, Default)]
pub struct RecordingWaveTracker {
    notifications: Mutex<Vec<WaveTag>>,
}

impl RecordingWaveTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<WaveTag> {
        self.notifications.lock().clone()
    }
}

impl WaveTracker for RecordingWaveTracker {
    fn notify_destroyed(&self, wave_index: u32, is_elite: bool) {
        self.notifications
            .lock()
            .push(WaveTag::new(wave_index, is_elite));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_animator_is_noop() {
        let mut animator = Animator::unbound();
        animator.trigger(anim::ATTACK);
        animator.float(anim::SPEED, 1.0);
        assert!(!animator.is_bound());
    }

    #[test]
    fn test_bound_animator_forwards() {
        let mock = MockAnimator::new();
        let mut animator = Animator::bound(Box::new(mock.clone()));
        animator.trigger(anim::ATTACK);
        animator.float(anim::SPEED, 2.5);
        animator.flag(anim::IN_COMBAT, true);

        assert_eq!(
            mock.calls(),
            vec![
                AnimCall::Trigger("Attack".to_string()),
                AnimCall::Float("Speed".to_string(), 2.5),
                AnimCall::Bool("InCombat".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_mock_navigator_clones_share_state() {
        let nav = MockNavigator::new();
        let mut handle = nav.clone();
        handle.set_stopped(true);
        handle.set_destination(Vec3::X);

        assert!(nav.is_stopped());
        assert_eq!(nav.destination(), Some(Vec3::X));
        assert_eq!(nav.snapshot().destinations_issued, 1);
    }

    #[test]
    fn test_mock_target_records_damage() {
        let mut target = MockTarget::at(Vec3::ZERO);
        target.take_damage(5.0, Vec3::X, 2.0);
        target.take_damage(3.0, Vec3::X, 2.0);
        assert_eq!(target.total_damage(), 8.0);
        assert_eq!(target.damage_taken[0].knockback_force, 2.0);
    }

    #[test]
    fn test_recording_wave_tracker() {
        let tracker = RecordingWaveTracker::new();
        tracker.notify_destroyed(2, false);
        assert_eq!(tracker.notifications(), vec![WaveTag::new(2, false)]);
    }
}
