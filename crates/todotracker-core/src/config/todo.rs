//! Todo hierarchy configuration.

use serde::{Deserialize, Serialize};

/// Subtask hierarchy constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Maximum nesting depth for subtasks (edges from a root).
    #[serde(default = "default_max_depth")]
    pub max_subtask_depth: u32,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            max_subtask_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> u32 {
    5
}
