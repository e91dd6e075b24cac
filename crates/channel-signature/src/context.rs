//! Identity contexts and the enrollment boundary
//!
//! An [`IdentityContext`] is the active signing identity for one operation.
//! It is always passed explicitly; nothing in the toolkit keeps a global
//! "current user".

use crate::keys::KeyMaterial;
use crate::store::{KeyMaterialStore, StoredCredential};
use async_trait::async_trait;
use channel_core::{ChannelError, Identity, Result};
use std::sync::Arc;

/// Certified identity plus the key material able to sign for it
#[derive(Debug, Clone)]
pub struct IdentityContext {
    identity: Identity,
    key: Option<KeyMaterial>,
}

impl IdentityContext {
    /// Context able to sign
    pub fn new(identity: Identity, key: KeyMaterial) -> Self {
        Self {
            identity,
            key: Some(key),
        }
    }

    /// Context carrying only a certificate (cannot sign)
    pub fn without_key(identity: Identity) -> Self {
        Self {
            identity,
            key: None,
        }
    }

    /// Certified identity
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether the context holds key material at all
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Key material, checked against the certificate
    pub(crate) fn signing_key(&self) -> Result<&KeyMaterial> {
        let key = self.key.as_ref().ok_or_else(|| {
            ChannelError::signing(format!("identity {} has no key material", self.identity))
        })?;

        if key.public_key() != self.identity.certificate.public_key {
            return Err(ChannelError::signing(format!(
                "key material does not match certificate of {}",
                self.identity
            )));
        }

        Ok(key)
    }

    /// Sign arbitrary bytes as this identity
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key()?.sign(message).to_vec())
    }
}

impl From<StoredCredential> for IdentityContext {
    fn from(credential: StoredCredential) -> Self {
        Self::new(credential.identity, credential.key)
    }
}

/// Enrollment boundary: produces the signing context for an organization
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain an identity context for `org`
    async fn enroll(&self, org: &str) -> Result<IdentityContext>;
}

/// Provider that serves previously enrolled credentials from a key store
pub struct StoreIdentityProvider {
    store: Arc<dyn KeyMaterialStore>,
}

impl StoreIdentityProvider {
    /// Wrap a key store
    pub fn new(store: Arc<dyn KeyMaterialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for StoreIdentityProvider {
    async fn enroll(&self, org: &str) -> Result<IdentityContext> {
        let credential = self.store.get(org)?.ok_or_else(|| {
            ChannelError::signing(format!("no enrolled credential for organization '{org}'"))
        })?;

        tracing::debug!(org, identity = %credential.identity, "Loaded identity context");
        Ok(credential.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyStore;
    use channel_core::{Certificate, ErrorKind, MspId, Role};

    fn identity_for(key: &KeyMaterial) -> Identity {
        Identity::new(
            MspId::new("Org2MSP"),
            Role::Admin,
            Certificate::new("admin@org2", key.public_key()),
        )
    }

    #[test]
    fn test_context_without_key_cannot_sign() {
        let key = KeyMaterial::from_secret_bytes(&[5u8; 32]);
        let ctx = IdentityContext::without_key(identity_for(&key));
        assert!(!ctx.has_key());
        assert_eq!(ctx.sign(b"x").unwrap_err().kind(), ErrorKind::Signing);
    }

    #[test]
    fn test_context_with_mismatched_key_cannot_sign() {
        let key = KeyMaterial::from_secret_bytes(&[5u8; 32]);
        let other = KeyMaterial::from_secret_bytes(&[6u8; 32]);
        let ctx = IdentityContext::new(identity_for(&key), other);
        assert_eq!(ctx.sign(b"x").unwrap_err().kind(), ErrorKind::Signing);
    }

    #[tokio::test]
    async fn test_store_provider_enrolls_known_org() {
        let store = Arc::new(MemoryKeyStore::new());
        let key = KeyMaterial::from_secret_bytes(&[8u8; 32]);
        store
            .put(
                "org2",
                StoredCredential {
                    identity: identity_for(&key),
                    key,
                },
            )
            .unwrap();

        let provider = StoreIdentityProvider::new(store);
        let ctx = provider.enroll("org2").await.unwrap();
        assert_eq!(ctx.identity().msp_id, MspId::new("Org2MSP"));
        assert!(ctx.sign(b"payload").is_ok());

        assert!(provider.enroll("org3").await.is_err());
    }
}
