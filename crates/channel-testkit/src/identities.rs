//! Deterministic test identities
//!
//! Keys are derived from a seed string, so the same name always yields the
//! same certificate across test runs.

use channel_core::{Certificate, Identity, MspId, Role};
use channel_signature::{
    IdentityContext, KeyMaterial, KeyMaterialStore, MemoryKeyStore, StoredCredential,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// First peer organization
pub const ORG1_MSP: &str = "Org1MSP";
/// Second peer organization
pub const ORG2_MSP: &str = "Org2MSP";
/// Orderer organization
pub const ORDERER_MSP: &str = "OrdererMSP";

/// Key material derived from a seed string
pub fn test_key(seed: &str) -> KeyMaterial {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    KeyMaterial::from_secret_bytes(&bytes)
}

/// Signing context for `role` in `msp`
pub fn test_context(msp: &str, role: Role) -> IdentityContext {
    let subject = match role {
        Role::Admin => format!("Admin@{msp}"),
        Role::Member => format!("User1@{msp}"),
    };
    let key = test_key(&subject);
    let identity = Identity::new(
        MspId::new(msp),
        role,
        Certificate::new(subject, key.public_key()),
    );
    IdentityContext::new(identity, key)
}

/// Admin signing context of `msp`
pub fn admin_context(msp: &str) -> IdentityContext {
    test_context(msp, Role::Admin)
}

/// Member signing context of `msp`
pub fn member_context(msp: &str) -> IdentityContext {
    test_context(msp, Role::Member)
}

/// Two peer organizations and one orderer organization
#[derive(Debug, Clone)]
pub struct TestNetwork {
    /// Org1 admin
    pub org1: IdentityContext,
    /// Org2 admin
    pub org2: IdentityContext,
    /// Orderer admin, also the submitter
    pub orderer: IdentityContext,
}

impl TestNetwork {
    /// The usual three-admin network
    pub fn standard() -> Self {
        Self {
            org1: admin_context(ORG1_MSP),
            org2: admin_context(ORG2_MSP),
            orderer: admin_context(ORDERER_MSP),
        }
    }

    /// Signers in collection order: Org1, Org2, orderer
    pub fn signers(&self) -> Vec<IdentityContext> {
        vec![self.org1.clone(), self.org2.clone(), self.orderer.clone()]
    }

    /// Identity that signs the broadcast
    pub fn submitter(&self) -> IdentityContext {
        self.orderer.clone()
    }

    /// Key store holding every admin under `org1`, `org2` and `orderer`
    pub fn key_store(&self) -> Arc<MemoryKeyStore> {
        let store = Arc::new(MemoryKeyStore::new());
        for (org, ctx) in [
            ("org1", &self.org1),
            ("org2", &self.org2),
            ("orderer", &self.orderer),
        ] {
            let key = test_key(&ctx.identity().certificate.subject);
            store
                .put(
                    org,
                    StoredCredential {
                        identity: ctx.identity().clone(),
                        key,
                    },
                )
                .unwrap();
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_are_deterministic() {
        let a = admin_context(ORG1_MSP);
        let b = admin_context(ORG1_MSP);
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), member_context(ORG1_MSP).identity());
        assert!(a.sign(b"x").is_ok());
    }

    #[test]
    fn test_key_store_round_trip() {
        let network = TestNetwork::standard();
        let store = network.key_store();
        let stored = store.get("org2").unwrap().unwrap();
        assert_eq!(&stored.identity, network.org2.identity());
    }
}
