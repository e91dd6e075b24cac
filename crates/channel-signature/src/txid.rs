//! Transaction id generation

use channel_core::{Identity, Result, TransactionId};
use rand::RngCore;

/// Length of the transaction nonce
pub const TX_NONCE_LEN: usize = 24;

/// Freshly generated transaction id and the nonce it was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionContext {
    /// Transaction id
    pub tx_id: TransactionId,
    /// Nonce bound into the id
    pub nonce: Vec<u8>,
}

/// Generate a new transaction id for `creator`
///
/// Every call draws a new nonce; ids are never reused across attempts.
pub fn new_transaction_id(creator: &Identity) -> Result<TransactionContext> {
    let mut nonce = vec![0u8; TX_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let tx_id = TransactionId::derive(&nonce, &creator.to_bytes()?);
    Ok(TransactionContext { tx_id, nonce })
}

#[cfg(test)]
mod tests {
    use super::*;
    use channel_core::{Certificate, MspId, Role};
    use std::collections::HashSet;

    #[test]
    fn test_transaction_ids_are_unique() {
        let creator = Identity::new(
            MspId::new("OrdererMSP"),
            Role::Admin,
            Certificate::new("admin@orderer", [2u8; 32]),
        );
        let ids: HashSet<_> = (0..64)
            .map(|_| new_transaction_id(&creator).unwrap().tx_id)
            .collect();
        assert_eq!(ids.len(), 64);
    }
}
