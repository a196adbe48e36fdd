//! Configuration for the batch module.

use serde::{Deserialize, Serialize};

/// Configuration for the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of items processed at once.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_max_parallel() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
        }
    }
}

impl BatchConfig {
    /// Sets the maximum parallel items.
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert!(config.max_parallel >= 1);
    }

    #[test]
    fn test_config_builder() {
        let config = BatchConfig::default().with_max_parallel(3);
        assert_eq!(config.max_parallel, 3);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config: BatchConfig = toml::from_str("").unwrap();
        assert!(config.max_parallel >= 1);
    }
}
