//! Hook pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hook execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Upper bound for a single hook invocation, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl HookConfig {
    /// Returns the per-hook timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}
