//! Hit reaction profiles.
//!
//! This module provides:
//! - Reaction kinds (flinch, knockback, knockdown)
//! - Force thresholds and per-kind timing/distance/lift parameters
//! - Loading profiles from TOML with validation

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::collaborators::anim;

/// Errors that can occur while loading a reaction profile.
#[derive(Debug, Error)]
pub enum ProfileLoadError {
    /// File not found.
    #[error("Reaction profile not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read reaction profile: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse reaction profile TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error.
    #[error("Reaction profile validation error: {0}")]
    ValidationError(String),
}

/// Result type for profile loading operations.
pub type ProfileLoadResult<T> = Result<T, ProfileLoadError>;

/// How an agent reacts to an incoming impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Brief pause in place.
    Flinch,
    /// Pushed away from the source.
    Knockback,
    /// Pushed away and thrown to the ground.
    Knockdown,
}

impl ReactionKind {
    /// Animation trigger fired when the reaction starts.
    #[must_use]
    pub const fn trigger_name(self) -> &'static str {
        match self {
            Self::Flinch => anim::FLINCH,
            Self::Knockback => anim::KNOCKBACK,
            Self::Knockdown => anim::KNOCKDOWN,
        }
    }

    /// Whether the reaction displaces the agent.
    #[must_use]
    pub const fn displaces(self) -> bool {
        matches!(self, Self::Knockback | Self::Knockdown)
    }
}

/// Thresholds and parameters for hit reactions.
///
/// `knockdown_threshold` is expected to be at least `knockback_threshold`.
/// When it is not, every force at or above the knockdown threshold is a
/// knockdown and knockback becomes unreachable for forces above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionProfile {
    /// Minimum force for a knockback.
    pub knockback_threshold: f32,
    /// Minimum force for a knockdown.
    pub knockdown_threshold: f32,
    /// Flinch pause (seconds).
    pub flinch_duration: f32,
    /// Knockback travel distance.
    pub knockback_distance: f32,
    /// Knockback travel time (seconds).
    pub knockback_duration: f32,
    /// Knockdown travel distance.
    pub knockdown_distance: f32,
    /// Knockdown travel time (seconds).
    pub knockdown_duration: f32,
    /// Peak height of the knockdown arc (0 = no lift).
    pub knockdown_lift: f32,
    /// Time spent on the ground after a knockdown (seconds).
    pub knockdown_recovery: f32,
}

impl Default for ReactionProfile {
    fn default() -> Self {
        Self {
            knockback_threshold: 2.0,
            knockdown_threshold: 6.0,
            flinch_duration: 0.25,
            knockback_distance: 1.5,
            knockback_duration: 0.3,
            knockdown_distance: 3.0,
            knockdown_duration: 0.6,
            knockdown_lift: 0.6,
            knockdown_recovery: 1.0,
        }
    }
}

impl ReactionProfile {
    /// Sets both thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, knockback: f32, knockdown: f32) -> Self {
        self.knockback_threshold = knockback;
        self.knockdown_threshold = knockdown;
        self
    }

    /// Sets knockback distance and duration.
    #[must_use]
    pub fn with_knockback(mut self, distance: f32, duration: f32) -> Self {
        self.knockback_distance = distance;
        self.knockback_duration = duration;
        self
    }

    /// Sets knockdown distance, duration, lift and recovery.
    #[must_use]
    pub fn with_knockdown(mut self, distance: f32, duration: f32, lift: f32, recovery: f32) -> Self {
        self.knockdown_distance = distance;
        self.knockdown_duration = duration;
        self.knockdown_lift = lift;
        self.knockdown_recovery = recovery;
        self
    }

    /// Classifies an impact force. Knockdown is checked before knockback.
    #[must_use]
    pub fn classify(&self, force: f32) -> ReactionKind {
        if force >= self.knockdown_threshold {
            ReactionKind::Knockdown
        } else if force >= self.knockback_threshold {
            ReactionKind::Knockback
        } else {
            ReactionKind::Flinch
        }
    }

    /// Whether the thresholds are ordered.
    #[must_use]
    pub fn thresholds_ordered(&self) -> bool {
        self.knockdown_threshold >= self.knockback_threshold
    }

    /// Validates the profile.
    ///
    /// Unordered thresholds are allowed and only logged.
    pub fn validate(&self) -> ProfileLoadResult<()> {
        let non_negative = [
            ("flinch_duration", self.flinch_duration),
            ("knockback_distance", self.knockback_distance),
            ("knockback_duration", self.knockback_duration),
            ("knockdown_distance", self.knockdown_distance),
            ("knockdown_duration", self.knockdown_duration),
            ("knockdown_lift", self.knockdown_lift),
            ("knockdown_recovery", self.knockdown_recovery),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileLoadError::ValidationError(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.thresholds_ordered() {
            warn!(
                knockback = self.knockback_threshold,
                knockdown = self.knockdown_threshold,
                "Knockdown threshold below knockback threshold, knockback is unreachable above it"
            );
        }
        Ok(())
    }

    /// Parses and validates a profile from TOML text.
    pub fn from_toml_str(contents: &str) -> ProfileLoadResult<Self> {
        let profile: Self = toml::from_str(contents)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Loads and validates a profile from a TOML file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ProfileLoadResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProfileLoadError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let profile = Self::from_toml_str(&contents)?;
        debug!("Loaded reaction profile from {}", path.display());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_classify_boundaries() {
        let profile = ReactionProfile::default().with_thresholds(2.0, 6.0);

        assert_eq!(profile.classify(6.0), ReactionKind::Knockdown);
        assert_eq!(profile.classify(2.0), ReactionKind::Knockback);
        assert_eq!(profile.classify(1.999), ReactionKind::Flinch);
        assert_eq!(profile.classify(3.0), ReactionKind::Knockback);
        assert_eq!(profile.classify(0.0), ReactionKind::Flinch);
    }

    #[test]
    fn test_classify_unordered_thresholds() {
        let profile = ReactionProfile::default().with_thresholds(5.0, 3.0);

        assert!(!profile.thresholds_ordered());
        assert_eq!(profile.classify(4.0), ReactionKind::Knockdown);
        assert_eq!(profile.classify(9.0), ReactionKind::Knockdown);
        assert_eq!(profile.classify(1.0), ReactionKind::Flinch);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_trigger_names() {
        assert_eq!(ReactionKind::Flinch.trigger_name(), "Flinch");
        assert_eq!(ReactionKind::Knockdown.trigger_name(), "Knockdown");
        assert!(!ReactionKind::Flinch.displaces());
        assert!(ReactionKind::Knockback.displaces());
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let profile = ReactionProfile::from_toml_str(
            "knockback_threshold = 1.0\nknockdown_threshold = 4.0\n",
        )
        .expect("valid profile");

        assert_eq!(profile.knockback_threshold, 1.0);
        assert_eq!(profile.knockdown_threshold, 4.0);
        assert_eq!(
            profile.flinch_duration,
            ReactionProfile::default().flinch_duration
        );
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result = ReactionProfile::from_toml_str("knockback_duration = -1.0\n");
        assert!(matches!(result, Err(ProfileLoadError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = ReactionProfile::from_toml_str("knockback_threshold = \"heavy\"\n");
        assert!(matches!(result, Err(ProfileLoadError::ParseError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "knockdown_lift = 0.0").expect("write");

        let profile = ReactionProfile::load_from(file.path()).expect("load");
        assert_eq!(profile.knockdown_lift, 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReactionProfile::load_from("/nonexistent/reactions.toml");
        assert!(matches!(result, Err(ProfileLoadError::NotFound(_))));
    }

    proptest! {
        #[test]
        fn prop_classification_monotonic(a in 0.0f32..20.0, b in 0.0f32..20.0) {
            let profile = ReactionProfile::default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let rank = |kind: ReactionKind| match kind {
                ReactionKind::Flinch => 0,
                ReactionKind::Knockback => 1,
                ReactionKind::Knockdown => 2,
            };
            prop_assert!(rank(profile.classify(low)) <= rank(profile.classify(high)));
        }
    }
}
