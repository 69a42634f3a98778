//! Reference-data cache configuration.

use serde::{Deserialize, Serialize};

/// Priority level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached priority snapshot remains valid, in seconds.
    #[serde(default = "default_ttl")]
    pub priority_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            priority_ttl_seconds: default_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}
