//! # Coordinator Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Readiness coordinator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Soft timeout in milliseconds before a transient phase is flagged
    /// slow. The phase is never cancelled; the signal just warns.
    pub slow_warning_ms: u64,
}

impl CoordinatorConfig {
    /// Soft timeout as a `Duration`.
    #[must_use]
    pub fn slow_warning(&self) -> Duration {
        Duration::from_millis(self.slow_warning_ms)
    }

    /// Create a config for testing (short timeout).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            slow_warning_ms: 100,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            slow_warning_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.slow_warning(), Duration::from_secs(5));
    }

    #[test]
    fn test_testing_config() {
        let config = CoordinatorConfig::for_testing();
        assert_eq!(config.slow_warning(), Duration::from_millis(100));
    }
}
