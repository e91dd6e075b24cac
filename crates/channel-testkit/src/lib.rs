//! Channel Testing Infrastructure
//!
//! Shared fixtures for channel-creation tests: deterministic organization
//! identities, config-transaction envelopes, creation policy presets, and a
//! loopback ordering service.
//!
//! ```toml
//! [dev-dependencies]
//! channel-testkit = { path = "../channel-testkit" }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod identities;
pub mod orderer;
pub mod policies;

pub use fixtures::*;
pub use identities::*;
pub use orderer::*;
pub use policies::*;
