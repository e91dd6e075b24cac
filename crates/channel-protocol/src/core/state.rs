//! Channel-creation run states
//!
//! ```text
//! Init -> ConfigExtracted -> SignaturesCollecting{signed, required}
//!      -> ReadyToSubmit -> Submitted -> Settled
//! any non-terminal state -> Failed{reason}
//! ```
//!
//! `Settled` and `Failed` are terminal. A failed run is never resumed; a
//! new attempt starts again from `Init` with a new transaction id.

use channel_core::ChannelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one channel-creation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CreationState {
    /// Nothing done yet
    Init,
    /// Envelope parsed into a config update
    ConfigExtracted,
    /// Collecting signatures, one per signer
    SignaturesCollecting {
        /// Signatures recorded so far
        signed: usize,
        /// Signatures this run will record, pre-collected ones included
        required: usize,
    },
    /// All signatures collected and the request assembled
    ReadyToSubmit,
    /// Request dispatched to the ordering service
    Submitted,
    /// Settle wait elapsed after acceptance
    Settled,
    /// Run stopped with an error
    Failed {
        /// Why the run failed
        reason: ChannelError,
    },
}

impl CreationState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed { .. })
    }

    /// Failure reason, if the run failed
    pub fn failure(&self) -> Option<&ChannelError> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short state name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ConfigExtracted => "config_extracted",
            Self::SignaturesCollecting { .. } => "signatures_collecting",
            Self::ReadyToSubmit => "ready_to_submit",
            Self::Submitted => "submitted",
            Self::Settled => "settled",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for CreationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignaturesCollecting { signed, required } => {
                write!(f, "signatures_collecting({signed}/{required})")
            }
            Self::Failed { reason } => write!(f, "failed({reason})"),
            other => f.write_str(other.name()),
        }
    }
}
