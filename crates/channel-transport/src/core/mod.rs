//! Submission trait and its implementations

/// In-process orderer
pub mod memory;
/// TCP and TLS orderer client
pub mod network;
/// Submission trait
pub mod traits;

pub use memory::MemoryOrderer;
pub use network::NetworkOrderer;
pub use traits::{response_to_result, OrdererSubmitter};
