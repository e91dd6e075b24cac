//! Organizational identities and their certificates
//!
//! Certificates are issued by an external enrollment service; this crate only
//! carries them. The public key is kept as raw bytes so that identity and
//! policy handling stay independent of the signature scheme.

use crate::errors::{ChannelError, Result};
use crate::identifiers::{MspId, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enrollment certificate binding a subject to a public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Certificate {
    /// Enrollment subject, e.g. `admin@org1.example.com`
    pub subject: String,
    /// Ed25519 public key
    #[serde(with = "hex::serde")]
    pub public_key: [u8; 32],
}

impl Certificate {
    /// Create a certificate for a subject and public key
    pub fn new(subject: impl Into<String>, public_key: [u8; 32]) -> Self {
        Self {
            subject: subject.into(),
            public_key,
        }
    }
}

/// Signing identity of an organization member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Owning organization
    pub msp_id: MspId,
    /// Role within the organization
    pub role: Role,
    /// Enrollment certificate
    pub certificate: Certificate,
}

impl Identity {
    /// Create a new identity
    pub fn new(msp_id: MspId, role: Role, certificate: Certificate) -> Self {
        Self {
            msp_id,
            role,
            certificate,
        }
    }

    /// Serialized creator form embedded in signature headers and transaction ids
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_cbor::to_vec(self).map_err(|e| {
            ChannelError::signing(format!("failed to serialize identity {self}: {e}"))
        })
    }

    /// Decode a serialized creator
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes)
            .map_err(|e| ChannelError::parse(format!("invalid serialized identity: {e}")))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}({})", self.msp_id, self.role, self.certificate.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_bytes_roundtrip() {
        let identity = Identity::new(
            MspId::new("Org1MSP"),
            Role::Admin,
            Certificate::new("admin@org1", [4u8; 32]),
        );
        let bytes = identity.to_bytes().unwrap();
        assert_eq!(Identity::from_bytes(&bytes).unwrap(), identity);
        assert_eq!(identity.to_string(), "Org1MSP:admin(admin@org1)");
    }

    #[test]
    fn test_identity_from_garbage_fails() {
        assert!(Identity::from_bytes(&[0xff, 0x00, 0x13]).is_err());
    }
}
