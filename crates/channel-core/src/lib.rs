//! Channel Core - types for multi-party channel creation
//!
//! This crate holds the pure pieces of the channel-creation protocol: the
//! config-transaction extractor, endorsement policies, identities, wire
//! messages, and the unified error type. Nothing here performs I/O except
//! loading a network profile from disk.
//!
//! # Layout
//!
//! - [`config_update`]: envelope parsing into [`ChannelConfigUpdate`]
//! - [`policy`]: [`PolicySpec`] and its descriptor format
//! - [`identity`], [`identifiers`]: organizations, roles, certificates
//! - [`messages`]: broadcast payloads and ordering-service responses
//! - [`config`]: TOML network profile
//! - [`endpoint`]: ordering-service endpoint URLs

#![forbid(unsafe_code)]

/// Network profile configuration
pub mod config;

/// Config-transaction envelope extraction
pub mod config_update;

/// Ordering-service endpoint URLs
pub mod endpoint;

/// Unified error handling
pub mod errors;

/// Channel, transaction, and organization identifiers
pub mod identifiers;

/// Identities and certificates
pub mod identity;

/// Ordering-service messages
pub mod messages;

/// Endorsement policies
pub mod policy;

/// Submission results
pub mod result;

pub use config::{NetworkProfile, OrdererProfile, OrgProfile, TimingProfile};
pub use config_update::{
    extract_channel_config, ChannelConfigUpdate, ConfigGroup, ConfigTxEnvelope, ConfigUpdate,
    ConfigUpdateExtractor, DeltaEntry, DeltaKind,
};
pub use endpoint::{OrdererEndpoint, Scheme};
pub use errors::{ChannelError, ErrorKind, Result};
pub use identifiers::{ChannelName, MspId, Role, TransactionId};
pub use identity::{Certificate, Identity};
pub use messages::{
    BroadcastEnvelope, BroadcastPayload, BroadcastResponse, BroadcastStatus, ConfigSignature,
    SignatureHeader,
};
pub use policy::{PolicyExpression, PolicyPrincipal, PolicySpec};
pub use result::{ChannelCreateResult, CreateStatus};
