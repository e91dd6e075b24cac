//! Channel Signature - multi-party signing for channel creation
//!
//! Identity contexts, key storage, config-update signature collection and
//! the assembly of the signed broadcast request. Verification helpers are
//! shared with the ordering service so both sides check the same bytes.

#![forbid(unsafe_code)]

/// Signature collection and the duplicate-signature shim
pub mod collector;

/// Identity contexts and enrollment
pub mod context;

/// Ed25519 key material
pub mod keys;

/// Channel-creation request builder
pub mod request;

/// Key material storage
pub mod store;

/// Transaction id generation
pub mod txid;

/// Signature and broadcast verification
pub mod verify;

pub use collector::{sign_config, DuplicateSignatures, SignatureCollector, SignatureRecord};
pub use context::{IdentityContext, IdentityProvider, StoreIdentityProvider};
pub use keys::KeyMaterial;
pub use request::{ChannelCreateRequest, ChannelCreateRequestBuilder};
pub use store::{FileKeyStore, KeyMaterialStore, MemoryKeyStore, StoredCredential};
pub use txid::{new_transaction_id, TransactionContext};
pub use verify::{verify_broadcast, verify_config_signature, verify_signature};
