//! Run configuration

use channel_core::{PolicySpec, TimingProfile};
use std::time::Duration;

/// Settings for one channel-creation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Advisory wait after the ordering service accepts
    pub settle_wait: Duration,
    /// Emit every signature twice for ordering services that expect it
    pub duplicate_signatures: bool,
    /// Creation policy checked locally before submitting
    pub policy: Option<PolicySpec>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            settle_wait: Duration::from_millis(5_000),
            duplicate_signatures: false,
            policy: None,
        }
    }
}

impl RunConfig {
    /// Near-instant settle wait for tests
    pub fn testing() -> Self {
        Self {
            settle_wait: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Settle wait taken from a network profile
    pub fn from_timing(timing: &TimingProfile) -> Self {
        Self {
            settle_wait: Duration::from_millis(timing.settle_wait_ms),
            ..Default::default()
        }
    }

    /// Check `policy` before submitting
    pub fn with_policy(mut self, policy: PolicySpec) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Override the settle wait
    pub fn with_settle_wait(mut self, settle_wait: Duration) -> Self {
        self.settle_wait = settle_wait;
        self
    }

    /// Enable the duplicate-signature shim
    pub fn with_duplicate_signatures(mut self, enabled: bool) -> Self {
        self.duplicate_signatures = enabled;
        self
    }
}
