//! Signature verification
//!
//! Pure cryptographic checks. Whether a verified signer set is *enough* is a
//! policy question answered by `channel_core::PolicySpec`.

use crate::collector::SignatureRecord;
use crate::keys;
use channel_core::{
    BroadcastEnvelope, BroadcastPayload, ChannelError, ConfigSignature, Identity, Result,
    SignatureHeader,
};

/// Verify a wire config signature and return the identity that produced it
pub fn verify_config_signature(signature: &ConfigSignature, config_bytes: &[u8]) -> Result<Identity> {
    let header = SignatureHeader::decode(&signature.signature_header)?;
    let creator = Identity::from_bytes(&header.creator)?;

    keys::verify(
        &creator.certificate.public_key,
        &signature.signed_message(config_bytes),
        &signature.signature,
    )
    .map_err(|e| {
        ChannelError::signing(format!("config signature by {creator} does not verify: {e}"))
    })?;

    Ok(creator)
}

/// Verify a signature record against the exact config bytes it claims to cover
pub fn verify_signature(record: &SignatureRecord, config_bytes: &[u8]) -> Result<()> {
    let creator = verify_config_signature(record.config_signature(), config_bytes)?;
    if &creator != record.signer() {
        return Err(ChannelError::signing(format!(
            "signature header names {creator} but record declares {}",
            record.signer()
        )));
    }
    Ok(())
}

/// Verify the submitter signature of a broadcast and decode its payload
pub fn verify_broadcast(envelope: &BroadcastEnvelope) -> Result<BroadcastPayload> {
    let payload = BroadcastPayload::decode(&envelope.payload)?;

    keys::verify(
        &payload.creator.certificate.public_key,
        &envelope.payload,
        &envelope.signature,
    )
    .map_err(|e| {
        ChannelError::signing(format!(
            "broadcast signature by {} does not verify: {e}",
            payload.creator
        ))
    })?;

    let expected = channel_core::TransactionId::derive(&payload.nonce, &payload.creator.to_bytes()?);
    if expected != payload.tx_id {
        return Err(ChannelError::validation(format!(
            "transaction id {} is not bound to its creator and nonce",
            payload.tx_id
        )));
    }

    Ok(payload)
}
