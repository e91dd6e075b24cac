//! Ed25519 key material for signing identities

use channel_core::{ChannelError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Length of an encoded signature
pub const SIGNATURE_LENGTH: usize = 64;

/// Private signing key of one identity
///
/// The wrapped key zeroizes itself on drop.
#[derive(Clone)]
pub struct KeyMaterial {
    signing_key: SigningKey,
}

impl KeyMaterial {
    /// Generate fresh key material from the OS RNG
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild key material from its 32-byte secret
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Decode key material from a hex secret
    pub fn from_hex(secret: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(secret.trim())?);
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ChannelError::signing(format!(
                "secret key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_secret_bytes(&secret))
    }

    /// Hex form of the secret key
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Public key bytes matching this secret
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// Verify an Ed25519 signature against raw public key bytes
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| ChannelError::signing(format!("invalid public key: {e}")))?;
    let signature = Signature::from_slice(signature).map_err(|_| {
        ChannelError::signing(format!(
            "invalid signature length: expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        ))
    })?;

    verifying_key
        .verify(message, &signature)
        .map_err(|e| ChannelError::signing(format!("signature verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        // Deterministic signing key avoids ambient randomness in tests
        let key = KeyMaterial::from_secret_bytes(&[7u8; 32]);
        let message = b"config update bytes";
        let signature = key.sign(message);

        assert!(verify(&key.public_key(), message, &signature).is_ok());
        assert!(verify(&key.public_key(), b"other bytes", &signature).is_err());
        assert!(verify(&key.public_key(), message, &signature[..10]).is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = KeyMaterial::generate();
        let restored = KeyMaterial::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.public_key(), restored.public_key());
        assert!(KeyMaterial::from_hex("abcd").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = KeyMaterial::from_secret_bytes(&[9u8; 32]);
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(key.to_hex().as_str()));
    }
}
