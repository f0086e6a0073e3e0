//! ID types for combat agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for agent IDs.
static AGENT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a combat agent.
///
/// Used as the key for token and ring-slot bookkeeping, so it must stay
/// stable for the whole lifetime of the agent (including pooled reuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    /// Allocates a new unique agent ID.
    #[must_use]
    pub fn new() -> Self {
        Self(AGENT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an agent ID from a raw value (for deserialization and tests).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid agent ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) agent ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Wave membership of a spawned agent, reported back when it is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WaveTag {
    /// Index of the wave that spawned the agent.
    pub wave_index: u32,
    /// Whether the agent counts as an elite for the wave.
    pub is_elite: bool,
}

impl WaveTag {
    /// Creates a wave tag.
    #[must_use]
    pub const fn new(wave_index: u32, is_elite: bool) -> Self {
        Self {
            wave_index,
            is_elite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_round_trip() {
        let id = AgentId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "agent#42");
    }

    #[test]
    fn test_ids_are_ordered_by_allocation() {
        let first = AgentId::new();
        let second = AgentId::new();
        assert!(second > first);
    }
}
