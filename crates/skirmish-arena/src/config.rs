//! Arena configuration.
//!
//! Provides configurable parameters for the simulated encounter: timing,
//! spawn layout, the scripted target, level obstacles and the scheduled
//! disruptions used to exercise stuns, suppression and hit reactions.
//! Configuration can be loaded from and saved to a TOML file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_ai::{AgentConfig, CoordinatorConfig, ReactionProfile};
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "skirmish.toml";

/// A round obstacle that blocks line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    /// Centre on the ground plane
    pub position: Vec3,
    /// Radius
    pub radius: f32,
}

/// A hit delivered to one agent at a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledHit {
    /// Simulation time (seconds)
    pub time: f32,
    /// Index of the agent to hit
    pub agent: usize,
    /// Damage dealt
    pub damage: f32,
    /// Impact force
    pub force: f32,
}

/// A stun applied to one agent at a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStun {
    /// Simulation time (seconds)
    pub time: f32,
    /// Index of the agent to stun
    pub agent: usize,
    /// Stun duration (seconds)
    pub duration: f32,
}

/// A window during which one agent is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuppressionWindow {
    /// Start time (seconds)
    pub start: f32,
    /// End time (seconds)
    pub end: f32,
    /// Index of the suppressed agent
    pub agent: usize,
}

/// Arena configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // === Simulation ===
    /// Fixed frame delta (seconds)
    pub frame_dt: f32,
    /// Simulated duration (seconds)
    pub duration: f32,
    /// RNG seed for agent jitter and patrol
    pub seed: u64,
    /// Interval between progress log lines (seconds, 0 = off)
    pub log_interval: f32,

    // === Spawning ===
    /// Number of agents
    pub agent_count: usize,
    /// Distance of the spawn ring from the arena centre
    pub spawn_radius: f32,
    /// Wave index reported when agents are removed
    pub wave_index: u32,
    /// Every n-th agent is an elite (0 = none)
    pub elite_every: usize,

    // === Target ===
    /// Radius of the target's orbit around the arena centre
    pub target_orbit_radius: f32,
    /// Angular speed of the target's orbit (radians per second)
    pub target_orbit_speed: f32,

    // === Level ===
    /// Line-of-sight blockers
    pub pillars: Vec<Pillar>,

    // === Disruptions ===
    /// Hits delivered to agents
    pub hits: Vec<ScheduledHit>,
    /// Stuns applied to agents
    pub stuns: Vec<ScheduledStun>,
    /// Suppression windows
    pub suppressions: Vec<SuppressionWindow>,

    // === Subsystems ===
    /// Agent tunables shared by every spawned agent
    pub agent: AgentConfig,
    /// Crowd coordinator settings
    pub coordinator: CoordinatorConfig,
    /// Inline reaction profile
    pub reactions: ReactionProfile,
    /// Reaction profile file that overrides `reactions` when set
    pub reaction_profile_path: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            // Simulation
            frame_dt: 1.0 / 60.0,
            duration: 20.0,
            seed: 7,
            log_interval: 5.0,

            // Spawning
            agent_count: 6,
            spawn_radius: 12.0,
            wave_index: 1,
            elite_every: 3,

            // Target
            target_orbit_radius: 3.0,
            target_orbit_speed: 0.4,

            // Level
            pillars: vec![Pillar {
                position: Vec3::new(6.0, 0.0, 6.0),
                radius: 1.0,
            }],

            // Disruptions
            hits: vec![
                ScheduledHit {
                    time: 4.0,
                    agent: 0,
                    damage: 5.0,
                    force: 1.0,
                },
                ScheduledHit {
                    time: 6.0,
                    agent: 1,
                    damage: 10.0,
                    force: 3.0,
                },
                ScheduledHit {
                    time: 8.0,
                    agent: 2,
                    damage: 15.0,
                    force: 8.0,
                },
            ],
            stuns: vec![ScheduledStun {
                time: 10.0,
                agent: 0,
                duration: 1.5,
            }],
            suppressions: vec![SuppressionWindow {
                start: 12.0,
                end: 14.0,
                agent: 3,
            }],

            // Subsystems
            agent: AgentConfig::default(),
            coordinator: CoordinatorConfig::default(),
            reactions: ReactionProfile::default(),
            reaction_profile_path: None,
        }
    }
}

impl ArenaConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp values to sane ranges.
    pub fn validate(&mut self) {
        // Simulation
        self.frame_dt = self.frame_dt.clamp(0.001, 0.25);
        self.duration = self.duration.clamp(0.0, 3600.0);
        self.log_interval = self.log_interval.max(0.0);

        // Spawning
        self.agent_count = self.agent_count.clamp(1, 256);
        self.spawn_radius = self.spawn_radius.max(0.0);

        // Target
        self.target_orbit_radius = self.target_orbit_radius.max(0.0);

        // Subsystems
        self.agent.validate();
        if let Err(e) = self.coordinator.validate() {
            warn!("Invalid coordinator config, using defaults: {e}");
            self.coordinator = CoordinatorConfig::default();
        }
        if let Err(e) = self.reactions.validate() {
            warn!("Invalid reaction profile, using defaults: {e}");
            self.reactions = ReactionProfile::default();
        }
    }

    /// Number of frames to simulate.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        (self.duration / self.frame_dt).round() as usize
    }

    /// Reaction profile in effect, reading `reaction_profile_path` if set.
    pub fn resolve_reactions(&self) -> ReactionProfile {
        let Some(path) = self.reaction_profile_path.as_ref() else {
            return self.reactions.clone();
        };
        match ReactionProfile::load_from(path) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Using inline reaction profile: {e}");
                self.reactions.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ArenaConfig::default();
        assert_eq!(config.agent_count, 6);
        assert_eq!(config.coordinator.max_active_attackers, 2);
        assert_eq!(config.frame_count(), 1200);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ArenaConfig::default();
        config.frame_dt = 5.0;
        config.agent_count = 0;
        config.coordinator.ring_slots = 0;

        config.validate();

        assert_eq!(config.frame_dt, 0.25);
        assert_eq!(config.agent_count, 1);
        assert_eq!(config.coordinator.ring_slots, 8);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("arena.toml");

        let mut config = ArenaConfig::default();
        config.agent_count = 9;
        config.coordinator.max_active_attackers = 3;
        config.agent.wave = None;
        config.save_to(&config_path).expect("Failed to save config");

        let loaded = ArenaConfig::load_from(&config_path);
        assert_eq!(loaded.agent_count, 9);
        assert_eq!(loaded.coordinator.max_active_attackers, 3);
        assert_eq!(loaded.hits, config.hits);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = ArenaConfig::load_from("/nonexistent/path/skirmish.toml");
        assert_eq!(config.agent_count, 6);
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "agent_count = \"many\"").expect("write");

        let config = ArenaConfig::load_from(&config_path);
        assert_eq!(config, ArenaConfig::default());
    }

    #[test]
    fn test_reaction_profile_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let profile_path = temp_dir.path().join("reactions.toml");
        fs::write(&profile_path, "knockback_threshold = 0.5\n").expect("write");

        let mut config = ArenaConfig::default();
        assert_eq!(config.resolve_reactions(), ReactionProfile::default());

        config.reaction_profile_path = Some(profile_path);
        assert_eq!(config.resolve_reactions().knockback_threshold, 0.5);

        config.reaction_profile_path = Some(temp_dir.path().join("missing.toml"));
        assert_eq!(config.resolve_reactions(), config.reactions);
    }
}
