//! Transport configuration

use crate::frame::DEFAULT_MAX_FRAME_SIZE;
use channel_core::{ChannelError, Result, TimingProfile};
use std::time::Duration;

/// Deadlines and limits for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Deadline for TCP connect and TLS handshake
    pub connect_timeout: Duration,

    /// Deadline for the whole submission round-trip
    pub submit_timeout: Duration,

    /// Largest frame accepted from the peer
    pub max_frame_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            submit_timeout: Duration::from_secs(30),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl TransportConfig {
    /// Short deadlines for tests
    pub fn testing() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            submit_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    /// Deadlines taken from a network profile
    pub fn from_timing(timing: &TimingProfile) -> Self {
        Self {
            connect_timeout: Duration::from_millis(timing.connect_timeout_ms),
            submit_timeout: Duration::from_millis(timing.submit_timeout_ms),
            ..Default::default()
        }
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(ChannelError::config("connect_timeout must be greater than 0"));
        }
        if self.submit_timeout.is_zero() {
            return Err(ChannelError::config("submit_timeout must be greater than 0"));
        }
        if self.max_frame_size == 0 {
            return Err(ChannelError::config("max_frame_size must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TransportConfig::default().validate().is_ok());
        assert!(TransportConfig::testing().validate().is_ok());
    }

    #[test]
    fn test_from_timing() {
        let config = TransportConfig::from_timing(&TimingProfile::default());
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.submit_timeout, Duration::from_secs(30));

        let zero = TransportConfig::from_timing(&TimingProfile {
            submit_timeout_ms: 0,
            ..Default::default()
        });
        assert!(zero.validate().is_err());
    }
}
