//! Terminal outcome of a submission

use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateStatus {
    /// Ordering service accepted the channel creation
    Success,
    /// Creation failed
    Failure,
    /// No answer within the deadline
    Timeout,
}

impl fmt::Display for CreateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Failure => f.write_str("FAILURE"),
            Self::Timeout => f.write_str("TIMEOUT"),
        }
    }
}

/// Result of submitting a channel-creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCreateResult {
    /// Outcome status
    pub status: CreateStatus,
    /// Error or informational detail
    pub detail: Option<String>,
}

impl ChannelCreateResult {
    /// Successful result
    pub fn success() -> Self {
        Self {
            status: CreateStatus::Success,
            detail: None,
        }
    }

    /// Failed result with a reason
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: CreateStatus::Failure,
            detail: Some(detail.into()),
        }
    }

    /// Timed-out result with a reason
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            status: CreateStatus::Timeout,
            detail: Some(detail.into()),
        }
    }

    /// Whether the channel creation was accepted
    pub fn is_success(&self) -> bool {
        self.status == CreateStatus::Success
    }
}
