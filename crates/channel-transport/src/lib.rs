//! Channel Transport - submission to the ordering service
//!
//! Defines the [`OrdererSubmitter`] boundary and two implementations:
//! [`NetworkOrderer`], which speaks length-prefixed JSON frames over TCP or
//! TLS under bounded deadlines, and [`MemoryOrderer`], which admits requests
//! in-process. Both reach the same [`OrderingService`] admission rules.
//!
//! Submissions are never retried here. A retry would need a fresh
//! transaction id, which only a new request can carry.

#![forbid(unsafe_code)]

/// Submission trait and implementations
pub mod core;

/// Length-prefixed JSON framing
pub mod frame;

/// TCP frame server
pub mod server;

/// Admission logic of the ordering service
pub mod service;

/// TLS client setup
pub mod tls;

/// Configuration and endpoint types
pub mod types;

pub use crate::core::{response_to_result, MemoryOrderer, NetworkOrderer, OrdererSubmitter};
pub use crate::server::serve;
pub use crate::service::OrderingService;
pub use crate::types::{OrdererEndpoint, Scheme, TransportConfig};
