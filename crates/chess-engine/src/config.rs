//! Engine configuration loaded from TOML.

use crate::ConfigError;
use crate::search::MAX_SEARCH_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunable engine settings.
///
/// Every key is optional in the TOML source; missing keys take the values
/// from [`EngineConfig::default`].
///
/// ```toml
/// threads = 2
/// hash_entries = 4194304
/// move_overhead_ms = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of search workers. The first reports results; the rest share
    /// the transposition table as helpers.
    pub threads: usize,
    /// Transposition-table slots, rounded up to a power of two.
    pub hash_entries: usize,
    /// Evaluation-cache slots, rounded up to a power of two.
    pub eval_cache_entries: usize,
    /// Ceiling for iterative deepening.
    pub max_depth: u8,
    /// How often the engine checks the clock during a search.
    pub poll_interval_ms: u64,
    /// Subtracted from clock-based budgets.
    pub move_overhead_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threads: 1,
            hash_entries: 1 << 20,
            eval_cache_entries: 1 << 16,
            max_depth: 64,
            poll_interval_ms: 5,
            move_overhead_ms: 10,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read,
    /// [`ConfigError::Parse`] for malformed TOML, and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        if self.hash_entries == 0 {
            return Err(ConfigError::Invalid("hash_entries must be at least 1".into()));
        }
        if self.eval_cache_entries == 0 {
            return Err(ConfigError::Invalid(
                "eval_cache_entries must be at least 1".into(),
            ));
        }
        if self.max_depth == 0 || self.max_depth > MAX_SEARCH_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "max_depth must be between 1 and {MAX_SEARCH_DEPTH}"
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn move_overhead(&self) -> Duration {
        Duration::from_millis(self.move_overhead_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.threads, 1);
        assert_eq!(config.poll_interval(), Duration::from_millis(5));
    }

    #[test]
    fn partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
threads = 4
hash_entries = 4096
move_overhead_ms = 50
"#,
        )
        .unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.hash_entries, 4096);
        assert_eq!(config.move_overhead(), Duration::from_millis(50));
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("threads = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_depth = 200"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("hash_entries = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("threads = \"many\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("colour = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            EngineConfig::load("/nonexistent/engine.toml"),
            Err(ConfigError::Read(_))
        ));
    }
}
