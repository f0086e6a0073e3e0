//! Error types for Project Skirmish.

use thiserror::Error;

/// Top-level error type for Skirmish operations.
///
/// Only data loading is fallible; the per-frame combat API absorbs every
/// runtime condition locally.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A configured value is out of its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type alias for Skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let err = SkirmishError::InvalidValue {
            field: "ring_slots".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for ring_slots: must be at least 1"
        );
    }

    #[test]
    fn test_toml_error_converts() {
        let parse: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: SkirmishError = parse.expect_err("should fail").into();
        assert!(matches!(err, SkirmishError::Config(_)));
    }
}
