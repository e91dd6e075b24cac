//! Transport configuration and endpoint types

/// Deadlines and limits
pub mod config;

pub use channel_core::{OrdererEndpoint, Scheme};
pub use config::TransportConfig;
