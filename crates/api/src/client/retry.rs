//! Authorization retry policy

use serde::{Deserialize, Serialize};

/// Upper bound on attempts per request, counting the first send
///
/// Each attempt after the first is preceded by exactly one session refresh,
/// so the default of two allows a single 401 → refresh → retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl RetryPolicy {
    /// Never refresh; the first 401 is terminal
    pub fn no_retry() -> Self {
        Self { max_attempts: 1 }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-based)
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// How concurrent 401s share session refreshes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Every request that hits a 401 runs its own refresh
    #[default]
    Independent,
    /// Refreshes are serialised; a waiter whose stale token was already
    /// replaced reuses the new session instead of refreshing again
    Coalesced,
}
