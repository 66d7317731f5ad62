//! Registry tuning knobs.
//!
//! Loaded as part of the game's TOML configuration; every field has a
//! default so partial tables are accepted.

use serde::{Deserialize, Serialize};

use crate::ecs::DEFAULT_POOL_CAPACITY;

/// Pre-allocation sizes for the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Dense slots reserved by each component pool when it is first created.
    pub initial_pool_capacity: usize,
    /// Entity slots reserved up front.
    pub initial_entity_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_pool_capacity: DEFAULT_POOL_CAPACITY,
            initial_entity_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config: RegistryConfig = toml::from_str("initial_pool_capacity = 16").unwrap();
        assert_eq!(config.initial_pool_capacity, 16);
        assert_eq!(
            config.initial_entity_capacity,
            RegistryConfig::default().initial_entity_capacity
        );
    }
}
