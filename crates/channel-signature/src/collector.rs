//! Config-update signature collection
//!
//! One [`SignatureRecord`] is produced per signer. Each signing step runs
//! under the collector's session lock, so identity switches on one collector
//! happen strictly one after another. Independent runs use independent
//! collectors.

use crate::context::IdentityContext;
use crate::verify::verify_signature;
use channel_core::{
    ChannelConfigUpdate, ChannelError, ConfigSignature, Identity, Result, SignatureHeader,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Length of the per-signature nonce
pub const SIGNATURE_NONCE_LEN: usize = 24;

/// Signature by one identity over one config update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    signer: Identity,
    signature: ConfigSignature,
}

impl SignatureRecord {
    /// Identity that produced the signature
    pub fn signer(&self) -> &Identity {
        &self.signer
    }

    /// Wire form of the signature
    pub fn config_signature(&self) -> &ConfigSignature {
        &self.signature
    }

    /// Verify against the config bytes
    pub fn verify(&self, config_bytes: &[u8]) -> Result<()> {
        verify_signature(self, config_bytes)
    }

    /// Storable hex form, so signatures can be collected offline and passed around
    pub fn to_hex(&self) -> Result<String> {
        let bytes = serde_cbor::to_vec(self)
            .map_err(|e| ChannelError::signing(format!("failed to encode signature: {e}")))?;
        Ok(hex::encode(bytes))
    }

    /// Decode the storable hex form
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())?;
        serde_cbor::from_slice(&bytes)
            .map_err(|e| ChannelError::parse(format!("invalid signature record: {e}")))
    }
}

/// Sign a config update as the given identity
///
/// The signature covers `encode(header) || config bytes`, where the header
/// carries the signer identity and a fresh random nonce.
pub fn sign_config(update: &ChannelConfigUpdate, ctx: &IdentityContext) -> Result<SignatureRecord> {
    let mut nonce = vec![0u8; SIGNATURE_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let header = SignatureHeader {
        creator: ctx.identity().to_bytes()?,
        nonce,
    }
    .encode()?;

    let mut signature = ConfigSignature {
        signature_header: header,
        signature: Vec::new(),
    };
    signature.signature = ctx.sign(&signature.signed_message(update.bytes()))?;

    Ok(SignatureRecord {
        signer: ctx.identity().clone(),
        signature,
    })
}

#[derive(Default)]
struct SigningSession {
    active: Option<Identity>,
}

/// Produces one signature per required signer
#[derive(Default)]
pub struct SignatureCollector {
    session: Mutex<SigningSession>,
    operations: AtomicUsize,
}

impl SignatureCollector {
    /// Create a collector with its own signing session
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign `update` under `ctx`
    ///
    /// Holds the session for the whole step; a concurrent call on the same
    /// collector waits until this identity is switched out again.
    pub async fn sign(
        &self,
        update: &ChannelConfigUpdate,
        ctx: &IdentityContext,
    ) -> Result<SignatureRecord> {
        let mut session = self.session.lock().await;
        if let Some(stale) = session.active.replace(ctx.identity().clone()) {
            tracing::warn!(stale = %stale, "Signing session still held a previous identity");
        }
        self.operations.fetch_add(1, Ordering::SeqCst);

        let result = sign_config(update, ctx);

        // never carry an identity over into the next step
        session.active = None;

        let record = result?;
        tracing::debug!(
            channel = update.channel_id(),
            signer = %record.signer(),
            "Signed config update"
        );
        Ok(record)
    }

    /// Sign with each context in order, one record per context
    pub async fn collect(
        &self,
        update: &ChannelConfigUpdate,
        contexts: &[IdentityContext],
    ) -> Result<Vec<SignatureRecord>> {
        let mut records = Vec::with_capacity(contexts.len());
        for ctx in contexts {
            records.push(self.sign(update, ctx).await?);
        }
        Ok(records)
    }

    /// Number of signing operations attempted through this collector
    pub fn signing_operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }
}

/// Legacy compatibility shim: emit every signature twice
///
/// Some ordering services miscounted config signatures and only accepted a
/// creation request when each admin signature appeared twice. One signature
/// per signer is the correct protocol; enable this only against such a
/// service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DuplicateSignatures;

impl DuplicateSignatures {
    /// Repeat each record once, keeping collection order
    pub fn apply(&self, records: &[SignatureRecord]) -> Vec<SignatureRecord> {
        records
            .iter()
            .flat_map(|record| [record.clone(), record.clone()])
            .collect()
    }
}
