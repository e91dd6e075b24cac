//! Channel Protocol - orchestration of channel creation
//!
//! Ties the pieces together: a pure state machine ([`core`]) and the async
//! [`ChannelCreationOrchestrator`] that drives it through extraction,
//! signing, submission and the settle wait.
//!
//! Each run owns its own signature collector, so independent runs may
//! proceed concurrently; within a run everything is sequential.

#![forbid(unsafe_code)]

/// Run cancellation
pub mod cancel;

/// Run configuration
pub mod config;

/// Pure state machine
pub mod core;

/// Async driver
pub mod orchestrator;

pub use crate::cancel::{cancellation, CancelHandle, CancelToken};
pub use crate::config::RunConfig;
pub use crate::core::{CreationState, TransitionResult};
pub use crate::orchestrator::{ChannelCreationOrchestrator, RunOutcome};
