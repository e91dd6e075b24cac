//! Messages exchanged with the ordering service
//!
//! A channel-creation submission is a [`BroadcastEnvelope`]: CBOR-encoded
//! [`BroadcastPayload`] bytes plus the submitter's signature over exactly
//! those bytes. The ordering service answers with a [`BroadcastResponse`].

use crate::errors::{ChannelError, Result};
use crate::identifiers::TransactionId;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header bound into every config signature
///
/// The signed message is `encode(header) || config_update_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    /// Serialized signer identity
    #[serde(with = "serde_bytes")]
    pub creator: Vec<u8>,
    /// Per-signature random nonce
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
}

impl SignatureHeader {
    /// Encode the header
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode a header
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes)
            .map_err(|e| ChannelError::parse(format!("invalid signature header: {e}")))
    }
}

/// One signature over a config update as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSignature {
    /// Encoded [`SignatureHeader`]
    #[serde(with = "hex::serde")]
    pub signature_header: Vec<u8>,
    /// Signature over `signature_header || config_update`
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl ConfigSignature {
    /// Bytes the signature covers
    pub fn signed_message(&self, config_update: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(self.signature_header.len() + config_update.len());
        message.extend_from_slice(&self.signature_header);
        message.extend_from_slice(config_update);
        message
    }
}

/// Channel-creation transaction body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPayload {
    /// Channel being created
    pub channel_id: String,
    /// Unique transaction id
    pub tx_id: TransactionId,
    /// Submitting identity
    pub creator: Identity,
    /// Nonce the transaction id was derived from
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
    /// Canonical config update bytes
    #[serde(with = "serde_bytes")]
    pub config_update: Vec<u8>,
    /// Collected config signatures, in collection order
    pub signatures: Vec<ConfigSignature>,
}

impl BroadcastPayload {
    /// Encode the payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode a payload
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes)
            .map_err(|e| ChannelError::parse(format!("invalid broadcast payload: {e}")))
    }
}

/// Signed submission sent to the ordering service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEnvelope {
    /// Encoded [`BroadcastPayload`]
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    /// Submitter signature over `payload`
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

/// Status codes returned by the ordering service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastStatus {
    /// Accepted for ordering
    Success,
    /// Malformed submission or config
    BadRequest,
    /// Signatures do not satisfy the creation policy
    Forbidden,
    /// Channel already exists
    Conflict,
    /// Transaction id already seen
    DuplicateTxid,
    /// Ordering service not accepting submissions
    ServiceUnavailable,
    /// Ordering service failure
    InternalServerError,
    /// Any status this client does not know
    #[serde(other)]
    Unknown,
}

impl BroadcastStatus {
    /// Wire form of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::BadRequest => "BAD_REQUEST",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::DuplicateTxid => "DUPLICATE_TXID",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BroadcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering service answer to a broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Outcome status
    pub status: BroadcastStatus,
    /// Human-readable detail
    #[serde(default)]
    pub info: String,
}

impl BroadcastResponse {
    /// Successful response
    pub fn success() -> Self {
        Self {
            status: BroadcastStatus::Success,
            info: String::new(),
        }
    }

    /// Rejection with a status and detail
    pub fn rejected(status: BroadcastStatus, info: impl Into<String>) -> Self {
        Self {
            status,
            info: info.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json_shape() {
        let json = serde_json::to_string(&BroadcastResponse::success()).unwrap();
        assert_eq!(json, r#"{"status":"SUCCESS","info":""}"#);

        let parsed: BroadcastResponse =
            serde_json::from_str(r#"{"status":"NOT_FOUND","info":"x"}"#).unwrap();
        assert_eq!(parsed.status, BroadcastStatus::Unknown);

        let parsed: BroadcastResponse = serde_json::from_str(r#"{"status":"SUCCESS"}"#).unwrap();
        assert_eq!(parsed.status, BroadcastStatus::Success);
    }

    #[test]
    fn test_signed_message_layout() {
        let sig = ConfigSignature {
            signature_header: vec![1, 2],
            signature: vec![],
        };
        assert_eq!(sig.signed_message(&[3, 4]), vec![1, 2, 3, 4]);
    }
}
