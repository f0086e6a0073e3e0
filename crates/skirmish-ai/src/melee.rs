//! Phased melee swing timer.
//!
//! A swing is driven by a single countdown that starts at
//! `windup + active + recovery` and runs down to zero. The damage window is
//! the sub-interval `[recovery, recovery + active]` of that countdown.

use serde::{Deserialize, Serialize};

// ============================================================================
// Timing
// ============================================================================

/// Timing configuration for one melee swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTiming {
    /// Duration of windup phase (seconds).
    pub windup: f32,
    /// Duration of active phase (seconds).
    pub active: f32,
    /// Duration of recovery phase (seconds).
    pub recovery: f32,
}

impl Default for MeleeTiming {
    fn default() -> Self {
        Self {
            windup: 0.35,
            active: 0.1,
            recovery: 0.45,
        }
    }
}

impl MeleeTiming {
    /// Creates a timing triple. Negative values are clamped to zero.
    #[must_use]
    pub fn new(windup: f32, active: f32, recovery: f32) -> Self {
        Self {
            windup: windup.max(0.0),
            active: active.max(0.0),
            recovery: recovery.max(0.0),
        }
    }

    /// Total swing duration.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.windup + self.active + self.recovery
    }

    /// Lower bound of the damage window on the countdown.
    #[must_use]
    pub fn window_start(&self) -> f32 {
        self.recovery
    }

    /// Upper bound of the damage window on the countdown.
    #[must_use]
    pub fn window_end(&self) -> f32 {
        self.recovery + self.active
    }

    /// Whether a countdown value lies inside the damage window (inclusive).
    #[must_use]
    pub fn in_window(&self, countdown: f32) -> bool {
        countdown >= self.window_start() && countdown <= self.window_end()
    }

    /// Phase for a countdown value.
    #[must_use]
    pub fn phase_at(&self, countdown: f32) -> SwingPhase {
        if countdown <= 0.0 {
            SwingPhase::Complete
        } else if countdown > self.window_end() {
            SwingPhase::Windup
        } else if countdown >= self.window_start() {
            SwingPhase::Active
        } else {
            SwingPhase::Recovery
        }
    }
}

// ============================================================================
// Swing state
// ============================================================================

/// Phase of a melee swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingPhase {
    /// Preparing to strike.
    Windup,
    /// Damage window.
    Active,
    /// Recovering after the strike.
    Recovery,
    /// No swing in progress.
    Complete,
}

/// Outcome of advancing a swing by one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingStep {
    /// The hit should be applied this frame.
    pub hit_now: bool,
    /// The swing ended this frame.
    pub finished: bool,
}

/// Runtime state of one melee swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeSwing {
    timing: MeleeTiming,
    remaining: f32,
    hit_applied: bool,
    attacking: bool,
}

impl MeleeSwing {
    /// Creates an idle swing.
    #[must_use]
    pub fn new(timing: MeleeTiming) -> Self {
        Self {
            timing,
            remaining: 0.0,
            hit_applied: false,
            attacking: false,
        }
    }

    /// Starts a new swing from the full duration.
    pub fn start(&mut self) {
        self.attacking = true;
        self.hit_applied = false;
        self.remaining = self.timing.total();
    }

    /// Aborts the swing without applying a hit.
    pub fn cancel(&mut self) {
        self.attacking = false;
        self.remaining = 0.0;
    }

    /// Whether a swing is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Whether this swing has already applied its hit.
    #[must_use]
    pub fn hit_applied(&self) -> bool {
        self.hit_applied
    }

    /// Countdown remaining.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SwingPhase {
        if self.attacking {
            self.timing.phase_at(self.remaining)
        } else {
            SwingPhase::Complete
        }
    }

    /// Timing this swing runs with.
    #[must_use]
    pub fn timing(&self) -> MeleeTiming {
        self.timing
    }

    /// Advances the countdown by `dt`.
    ///
    /// The hit fires at most once per swing: on the frame the countdown is
    /// first found inside the window, or when the previous countdown was
    /// inside and this step carried it past the window in one go. A step
    /// that jumps from above the window to below it skips the hit.
    pub fn advance(&mut self, dt: f32) -> SwingStep {
        if !self.attacking {
            return SwingStep::default();
        }

        let previous = self.remaining;
        self.remaining -= dt;

        let mut step = SwingStep::default();
        if !self.hit_applied
            && (self.timing.in_window(self.remaining) || self.timing.in_window(previous))
        {
            self.hit_applied = true;
            step.hit_now = true;
        }

        if self.remaining <= 0.0 {
            self.attacking = false;
            self.remaining = 0.0;
            step.finished = true;
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swing() -> MeleeSwing {
        MeleeSwing::new(MeleeTiming::new(0.35, 0.1, 0.45))
    }

    #[test]
    fn test_timing_total_and_window() {
        let timing = MeleeTiming::default();
        assert!((timing.total() - 0.9).abs() < 1e-6);
        assert!((timing.window_start() - 0.45).abs() < 1e-6);
        assert!((timing.window_end() - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_hit_applied_exactly_once() {
        let mut swing = swing();
        swing.start();

        let mut hits = 0;
        let mut frames = 0;
        while swing.is_attacking() {
            let step = swing.advance(0.05);
            if step.hit_now {
                hits += 1;
            }
            frames += 1;
            assert!(frames < 100, "swing never finished");
        }

        assert_eq!(hits, 1);
        assert!(swing.hit_applied());
    }

    #[test]
    fn test_hit_lands_inside_window() {
        let mut swing = swing();
        swing.start();

        let mut hit_countdown = None;
        while swing.is_attacking() {
            if swing.advance(0.01).hit_now {
                hit_countdown = Some(swing.remaining());
            }
        }

        let countdown = hit_countdown.expect("hit applied");
        assert!(countdown <= 0.55 + 1e-4 && countdown >= 0.45 - 1e-4);
    }

    #[test]
    fn test_large_step_over_window_skips_hit() {
        let mut swing = swing();
        swing.start();

        // 0.9 -> 0.6 (windup), then 0.6 -> 0.3 jumps across [0.45, 0.55]
        assert!(!swing.advance(0.3).hit_now);
        assert!(!swing.advance(0.3).hit_now);
        let last = swing.advance(0.5);
        assert!(!last.hit_now);
        assert!(last.finished);
        assert!(!swing.hit_applied());
    }

    #[test]
    fn test_step_leaving_window_still_hits() {
        let mut swing = MeleeSwing::new(MeleeTiming::new(0.0, 0.1, 0.45));
        swing.start();

        // Starts at the top edge of the window and leaves it in one step.
        let step = swing.advance(0.2);
        assert!(step.hit_now);
        assert!(!step.finished);
    }

    #[test]
    fn test_single_frame_swing_finishes() {
        let mut swing = MeleeSwing::new(MeleeTiming::new(0.1, 0.1, 0.1));
        swing.start();

        let step = swing.advance(1.0);
        assert!(step.finished);
        assert!(!swing.is_attacking());
    }

    #[test]
    fn test_cancel_suppresses_hit() {
        let mut swing = swing();
        swing.start();
        swing.advance(0.3);
        swing.cancel();

        assert_eq!(swing.advance(0.1), SwingStep::default());
        assert!(!swing.hit_applied());
        assert_eq!(swing.phase(), SwingPhase::Complete);
    }

    #[test]
    fn test_phases_follow_countdown() {
        let timing = MeleeTiming::default();
        assert_eq!(timing.phase_at(0.9), SwingPhase::Windup);
        assert_eq!(timing.phase_at(0.5), SwingPhase::Active);
        assert_eq!(timing.phase_at(0.2), SwingPhase::Recovery);
        assert_eq!(timing.phase_at(0.0), SwingPhase::Complete);
    }

    #[test]
    fn test_restart_clears_hit_flag() {
        let mut swing = swing();
        swing.start();
        while swing.is_attacking() {
            swing.advance(0.05);
        }
        assert!(swing.hit_applied());

        swing.start();
        assert!(!swing.hit_applied());
        assert_eq!(swing.phase(), SwingPhase::Windup);
    }
}
