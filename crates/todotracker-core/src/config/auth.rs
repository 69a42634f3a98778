//! API key authentication configuration.

use serde::{Deserialize, Serialize};

/// API key authentication configuration.
///
/// Authentication is disabled when no key is configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// The API key clients must present. `None` disables authentication.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AuthConfig {
    /// Whether API key authentication is enabled.
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
