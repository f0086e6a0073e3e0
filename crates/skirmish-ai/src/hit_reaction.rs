//! Hit reactions.
//!
//! Turns an incoming impact into a flinch, knockback or knockdown and drives
//! the resulting displacement as a resumable routine advanced once per frame.
//! While a routine runs, the owning agent's autonomy and navigation authority
//! are suspended.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;
use skirmish_common::{horizontal_direction, Transform};
use tracing::debug;

use crate::collaborators::{Animator, Navigator, Poolable};
use crate::profile::{ReactionKind, ReactionProfile};

/// Result of advancing the reaction engine by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStatus {
    /// No reaction in progress.
    Idle,
    /// A reaction is still running; the agent stays suspended.
    Running,
    /// The reaction finished this frame and control was returned.
    Finished(ReactionKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutinePhase {
    Displace,
    Recover,
}

/// A reaction in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionRoutine {
    /// Reaction being played
    pub kind: ReactionKind,
    /// Time spent in the current phase
    pub elapsed: f32,
    /// Displacement duration
    pub duration: f32,
    /// Position at the moment of impact
    pub start: Vec3,
    /// Position at the end of the displacement
    pub end: Vec3,
    /// Peak height of the half-sine arc
    pub lift: f32,
    /// Pause after the displacement
    pub recovery: f32,
    phase: RoutinePhase,
}

impl ReactionRoutine {
    /// Normalized displacement progress (0..=1).
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.phase {
            RoutinePhase::Recover => 1.0,
            RoutinePhase::Displace if self.duration <= 0.0 => 1.0,
            RoutinePhase::Displace => (self.elapsed / self.duration).clamp(0.0, 1.0),
        }
    }

    fn position_at(&self, t: f32) -> Vec3 {
        if t >= 1.0 {
            return self.end;
        }
        let arc = if self.lift > 0.0 {
            self.lift * (PI * t).sin()
        } else {
            0.0
        };
        self.start.lerp(self.end, t) + Vec3::Y * arc
    }
}

/// Per-agent hit reaction state machine.
#[derive(Debug, Clone, Default)]
pub struct HitReactionEngine {
    profile: Option<Arc<ReactionProfile>>,
    fallback: ReactionProfile,
    routine: Option<ReactionRoutine>,
}

impl HitReactionEngine {
    /// Creates an engine using the built-in default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a shared profile instead of the built-in defaults.
    #[must_use]
    pub fn with_profile(mut self, profile: Arc<ReactionProfile>) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Profile in effect.
    #[must_use]
    pub fn profile(&self) -> &ReactionProfile {
        self.profile.as_deref().unwrap_or(&self.fallback)
    }

    /// Whether a reaction is running.
    #[must_use]
    pub fn is_reacting(&self) -> bool {
        self.routine.is_some()
    }

    /// The running reaction, if any.
    #[must_use]
    pub fn routine(&self) -> Option<&ReactionRoutine> {
        self.routine.as_ref()
    }

    /// Classifies and starts a reaction, replacing any running one.
    ///
    /// The agent is pushed horizontally away from `source`. When the agent
    /// stands on the source, it is pushed along its backward axis.
    pub fn apply_hit(
        &mut self,
        source: Vec3,
        force: f32,
        body: &Transform,
        navigator: &mut dyn Navigator,
        animator: &mut Animator,
    ) -> ReactionKind {
        let profile = self.profile();
        let kind = profile.classify(force);

        let away = horizontal_direction(body.position - source)
            .or_else(|| horizontal_direction(body.backward()))
            .unwrap_or(Vec3::NEG_Z);

        let (distance, duration, lift, recovery) = match kind {
            ReactionKind::Flinch => (0.0, profile.flinch_duration, 0.0, 0.0),
            ReactionKind::Knockback => (
                profile.knockback_distance,
                profile.knockback_duration,
                0.0,
                0.0,
            ),
            ReactionKind::Knockdown => (
                profile.knockdown_distance,
                profile.knockdown_duration,
                profile.knockdown_lift,
                profile.knockdown_recovery,
            ),
        };

        if let Some(previous) = self.routine.take() {
            debug!(replaced = ?previous.kind, with = ?kind, "Reaction interrupted by new hit");
        }

        navigator.set_stopped(true);
        navigator.set_authority(false, false);
        animator.trigger(kind.trigger_name());

        self.routine = Some(ReactionRoutine {
            kind,
            elapsed: 0.0,
            duration,
            start: body.position,
            end: body.position + away * distance,
            lift,
            recovery,
            phase: RoutinePhase::Displace,
        });
        debug!(?kind, force, "Hit reaction started");
        kind
    }

    /// Advances the running reaction and moves `body` along its curve.
    pub fn tick(
        &mut self,
        dt: f32,
        body: &mut Transform,
        navigator: &mut dyn Navigator,
    ) -> ReactionStatus {
        let Some(routine) = self.routine.as_mut() else {
            return ReactionStatus::Idle;
        };

        routine.elapsed += dt;

        if routine.phase == RoutinePhase::Displace {
            let t = routine.progress();
            body.position = routine.position_at(t);
            if t < 1.0 {
                return ReactionStatus::Running;
            }
            // Leftover frame time counts towards the recovery pause.
            routine.elapsed = (routine.elapsed - routine.duration).max(0.0);
            routine.phase = RoutinePhase::Recover;
        }

        if routine.elapsed < routine.recovery {
            return ReactionStatus::Running;
        }

        let kind = routine.kind;
        self.routine = None;
        restore_navigation(body, navigator);
        debug!(?kind, "Hit reaction finished");
        ReactionStatus::Finished(kind)
    }

    /// Stops any running reaction and hands navigation back at the current position.
    pub fn cancel_reaction(
        &mut self,
        body: &Transform,
        navigator: &mut dyn Navigator,
    ) -> Option<ReactionKind> {
        let routine = self.routine.take()?;
        restore_navigation(body, navigator);
        debug!(kind = ?routine.kind, "Hit reaction cancelled");
        Some(routine.kind)
    }
}

fn restore_navigation(body: &Transform, navigator: &mut dyn Navigator) {
    navigator.warp_to(body.position);
    navigator.set_authority(true, true);
    navigator.set_stopped(false);
}

impl Poolable for HitReactionEngine {
    /// Drops any routine left over from a previous life. Navigation is
    /// re-anchored by the owning agent.
    fn on_acquire(&mut self) {
        self.routine = None;
    }

    fn on_release(&mut self) {
        self.routine = None;
    }
}
