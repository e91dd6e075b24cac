//! Channel-creation request assembly
//!
//! The builder validates inputs, draws a fresh transaction id for the
//! submitter, and signs the broadcast payload. The resulting
//! [`ChannelCreateRequest`] is immutable and is submitted exactly once.

use crate::collector::{DuplicateSignatures, SignatureRecord};
use crate::context::IdentityContext;
use crate::txid::new_transaction_id;
use channel_core::{
    BroadcastEnvelope, BroadcastPayload, ChannelConfigUpdate, ChannelError, ChannelName, Identity,
    OrdererProfile, PolicySpec, Result, TransactionId,
};

/// Immutable, signed channel-creation request
#[derive(Debug, Clone)]
pub struct ChannelCreateRequest {
    config: ChannelConfigUpdate,
    signatures: Vec<SignatureRecord>,
    channel: ChannelName,
    tx_id: TransactionId,
    orderer: OrdererProfile,
    submitter: Identity,
    envelope: BroadcastEnvelope,
}

impl ChannelCreateRequest {
    /// Start building a request
    pub fn builder() -> ChannelCreateRequestBuilder {
        ChannelCreateRequestBuilder::default()
    }

    /// Config update being submitted
    pub fn config(&self) -> &ChannelConfigUpdate {
        &self.config
    }

    /// Signatures as carried on the wire, in collection order
    pub fn signatures(&self) -> &[SignatureRecord] {
        &self.signatures
    }

    /// Channel being created
    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Transaction id of this attempt
    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    /// Target ordering endpoint
    pub fn orderer(&self) -> &OrdererProfile {
        &self.orderer
    }

    /// Identity that signed the broadcast
    pub fn submitter(&self) -> &Identity {
        &self.submitter
    }

    /// Signed broadcast envelope
    pub fn envelope(&self) -> &BroadcastEnvelope {
        &self.envelope
    }
}

/// Builder for [`ChannelCreateRequest`]
#[derive(Debug, Default)]
pub struct ChannelCreateRequestBuilder {
    config: Option<ChannelConfigUpdate>,
    signatures: Vec<SignatureRecord>,
    channel_name: Option<String>,
    orderer: Option<OrdererProfile>,
    policy: Option<PolicySpec>,
    duplicate_signatures: bool,
}

impl ChannelCreateRequestBuilder {
    /// Config update to submit
    pub fn config(mut self, config: ChannelConfigUpdate) -> Self {
        self.config = Some(config);
        self
    }

    /// Append one signature
    pub fn signature(mut self, record: SignatureRecord) -> Self {
        self.signatures.push(record);
        self
    }

    /// Append signatures, keeping their order
    pub fn signatures(mut self, records: impl IntoIterator<Item = SignatureRecord>) -> Self {
        self.signatures.extend(records);
        self
    }

    /// Channel name
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    /// Target ordering endpoint
    pub fn orderer(mut self, orderer: OrdererProfile) -> Self {
        self.orderer = Some(orderer);
        self
    }

    /// Declared creation policy; without one, at least one signature is required
    pub fn policy(mut self, policy: PolicySpec) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Enable the [`DuplicateSignatures`] compatibility shim
    pub fn duplicate_signatures(mut self, enabled: bool) -> Self {
        self.duplicate_signatures = enabled;
        self
    }

    /// Validate, draw a transaction id, and sign the broadcast as `submitter`
    pub fn build(self, submitter: &IdentityContext) -> Result<ChannelCreateRequest> {
        let config = self
            .config
            .ok_or_else(|| ChannelError::validation("request has no config update"))?;

        let channel = ChannelName::new(self.channel_name.unwrap_or_default())?;
        if channel.as_str() != config.channel_id() {
            return Err(ChannelError::validation(format!(
                "channel name '{channel}' does not match config update channel '{}'",
                config.channel_id()
            )));
        }

        let orderer = self
            .orderer
            .ok_or_else(|| ChannelError::validation("request has no target orderer"))?;

        let accept_all = self.policy.as_ref().is_some_and(PolicySpec::is_accept_all);
        if self.signatures.is_empty() && !accept_all {
            return Err(ChannelError::validation(
                "at least one signature is required unless the policy accepts all",
            ));
        }

        for record in &self.signatures {
            record.verify(config.bytes()).map_err(|e| {
                ChannelError::validation(format!(
                    "signature by {} is not valid for this config: {e}",
                    record.signer()
                ))
            })?;
        }

        let signatures = if self.duplicate_signatures {
            DuplicateSignatures.apply(&self.signatures)
        } else {
            self.signatures
        };

        let submitter_identity = submitter.identity().clone();
        let tx = new_transaction_id(&submitter_identity)?;

        let payload = BroadcastPayload {
            channel_id: channel.as_str().to_string(),
            tx_id: tx.tx_id.clone(),
            creator: submitter_identity.clone(),
            nonce: tx.nonce,
            config_update: config.bytes().to_vec(),
            signatures: signatures
                .iter()
                .map(|r| r.config_signature().clone())
                .collect(),
        }
        .encode()?;
        let signature = submitter.sign(&payload)?;

        tracing::info!(
            channel = %channel,
            tx_id = %tx.tx_id,
            signatures = signatures.len(),
            submitter = %submitter_identity,
            "Built channel create request"
        );

        Ok(ChannelCreateRequest {
            config,
            signatures,
            channel,
            tx_id: tx.tx_id,
            orderer,
            submitter: submitter_identity,
            envelope: BroadcastEnvelope { payload, signature },
        })
    }
}
