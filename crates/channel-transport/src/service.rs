//! Ordering-service admission logic
//!
//! [`OrderingService`] decides whether a channel-creation broadcast is
//! admitted. It backs both the in-process [`crate::MemoryOrderer`] and the
//! frame server in [`crate::server`], so tests exercise the same checks
//! whichever path a request takes.

use channel_core::{
    BroadcastEnvelope, BroadcastPayload, BroadcastResponse, BroadcastStatus, ChannelName,
    ConfigUpdate, ErrorKind, Identity, PolicySpec, TransactionId,
};
use channel_signature::{verify_broadcast, verify_config_signature};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct LedgerState {
    /// Created channels and the transaction that created them
    channels: BTreeMap<String, Option<TransactionId>>,
    seen_transactions: HashSet<TransactionId>,
}

/// Admits or rejects channel-creation broadcasts
#[derive(Debug)]
pub struct OrderingService {
    policy: PolicySpec,
    state: RwLock<LedgerState>,
}

impl OrderingService {
    /// Service enforcing `policy` for every new channel
    pub fn new(policy: PolicySpec) -> Self {
        Self {
            policy,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Channel creation policy
    pub fn policy(&self) -> &PolicySpec {
        &self.policy
    }

    /// Record a channel that already exists
    pub async fn insert_existing_channel(&self, name: impl Into<String>) {
        self.state.write().await.channels.insert(name.into(), None);
    }

    /// Whether `name` has been created
    pub async fn channel_exists(&self, name: &str) -> bool {
        self.state.read().await.channels.contains_key(name)
    }

    /// Names of all known channels
    pub async fn channels(&self) -> Vec<String> {
        self.state.read().await.channels.keys().cloned().collect()
    }

    /// Transaction that created `name`, if it was created through this service
    pub async fn creating_transaction(&self, name: &str) -> Option<TransactionId> {
        self.state.read().await.channels.get(name).cloned().flatten()
    }

    /// Decide on one broadcast
    pub async fn handle(&self, envelope: &BroadcastEnvelope) -> BroadcastResponse {
        let payload = match verify_broadcast(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                let status = if e.kind() == ErrorKind::Signing {
                    BroadcastStatus::Forbidden
                } else {
                    BroadcastStatus::BadRequest
                };
                return reject(status, e.to_string());
            }
        };

        if let Err(info) = check_config(&payload) {
            return reject(BroadcastStatus::BadRequest, info);
        }

        let mut state = self.state.write().await;

        if !state.seen_transactions.insert(payload.tx_id.clone()) {
            return reject(
                BroadcastStatus::DuplicateTxid,
                format!("transaction {} was already submitted", payload.tx_id),
            );
        }

        if state.channels.contains_key(&payload.channel_id) {
            return reject(
                BroadcastStatus::Conflict,
                format!("channel '{}' already exists", payload.channel_id),
            );
        }

        let signers = match valid_signers(&payload) {
            Ok(signers) => signers,
            Err(info) => return reject(BroadcastStatus::BadRequest, info),
        };

        if !self.policy.is_satisfied_by(&signers) {
            return reject(
                BroadcastStatus::Forbidden,
                format!(
                    "{} distinct signer(s) do not satisfy the channel creation policy",
                    signers.len()
                ),
            );
        }

        state
            .channels
            .insert(payload.channel_id.clone(), Some(payload.tx_id.clone()));

        tracing::info!(
            channel = %payload.channel_id,
            tx_id = %payload.tx_id,
            signers = signers.len(),
            "Channel created"
        );
        BroadcastResponse::success()
    }
}

fn reject(status: BroadcastStatus, info: String) -> BroadcastResponse {
    tracing::warn!(%status, %info, "Rejected channel creation");
    BroadcastResponse::rejected(status, info)
}

fn check_config(payload: &BroadcastPayload) -> Result<(), String> {
    ChannelName::validate(&payload.channel_id).map_err(|e| e.to_string())?;

    let update = ConfigUpdate::decode(&payload.config_update).map_err(|e| e.to_string())?;
    if update.channel_id != payload.channel_id {
        return Err(format!(
            "config update targets '{}' but broadcast names '{}'",
            update.channel_id, payload.channel_id
        ));
    }
    Ok(())
}

/// Verify every config signature and return the distinct signers
///
/// Repeated signatures by one identity count once.
fn valid_signers(payload: &BroadcastPayload) -> Result<Vec<Identity>, String> {
    let mut signers: Vec<Identity> = Vec::with_capacity(payload.signatures.len());
    for (position, signature) in payload.signatures.iter().enumerate() {
        let signer = verify_config_signature(signature, &payload.config_update)
            .map_err(|e| format!("config signature {position} is invalid: {e}"))?;
        if !signers.contains(&signer) {
            signers.push(signer);
        }
    }
    Ok(signers)
}
