//! Config-transaction envelope extraction
//!
//! The envelope is produced by an external configtx tool. Extraction only
//! pulls out what signing needs: the config update bytes, kept verbatim as
//! the canonical signing input, and the decoded read/write sets.
//!
//! Envelope layout (CBOR, version 1):
//!
//! ```text
//! ConfigTxEnvelope { version, header: { kind, channel_id }, config_update: bytes }
//! config_update => ConfigUpdate { channel_id, read_set, write_set }
//! ```

use crate::errors::{ChannelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Envelope versions this extractor understands
pub const SUPPORTED_ENVELOPE_VERSIONS: &[u32] = &[1];

/// Name of the root configuration group
pub const ROOT_GROUP: &str = "Channel";

/// Kind of payload carried by an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderKind {
    /// Channel configuration update (what channel creation consumes)
    ConfigUpdate,
    /// Full channel configuration block
    Config,
    /// Ordinary endorsed transaction
    EndorserTransaction,
}

/// Envelope header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    /// Payload kind
    pub kind: HeaderKind,
    /// Channel the payload targets
    pub channel_id: String,
}

/// Raw config-transaction envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTxEnvelope {
    /// Format version
    pub version: u32,
    /// Envelope header
    pub header: EnvelopeHeader,
    /// Encoded [`ConfigUpdate`]
    #[serde(with = "serde_bytes")]
    pub config_update: Vec<u8>,
}

impl ConfigTxEnvelope {
    /// Wrap an encoded config update in a version 1 envelope
    pub fn wrap(channel_id: impl Into<String>, config_update: Vec<u8>) -> Self {
        Self {
            version: 1,
            header: EnvelopeHeader {
                kind: HeaderKind::ConfigUpdate,
                channel_id: channel_id.into(),
            },
            config_update,
        }
    }

    /// Encode the envelope
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }
}

/// Configuration value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    /// Modification version
    pub version: u64,
    /// Opaque encoded value
    #[serde(with = "serde_bytes", default)]
    pub value: Vec<u8>,
    /// Policy governing modification
    #[serde(default)]
    pub mod_policy: String,
}

/// Configuration policy slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPolicy {
    /// Modification version
    pub version: u64,
    /// Opaque encoded policy
    #[serde(with = "serde_bytes", default)]
    pub policy: Vec<u8>,
    /// Policy governing modification
    #[serde(default)]
    pub mod_policy: String,
}

/// Hierarchical configuration group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigGroup {
    /// Modification version
    pub version: u64,
    /// Child groups
    #[serde(default)]
    pub groups: BTreeMap<String, ConfigGroup>,
    /// Values in this group
    #[serde(default)]
    pub values: BTreeMap<String, ConfigValue>,
    /// Policies in this group
    #[serde(default)]
    pub policies: BTreeMap<String, ConfigPolicy>,
    /// Policy governing modification
    #[serde(default)]
    pub mod_policy: String,
}

/// Decoded config update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// Channel the update targets
    pub channel_id: String,
    /// Versions the update was computed against
    #[serde(default)]
    pub read_set: ConfigGroup,
    /// Versions the update writes
    #[serde(default)]
    pub write_set: ConfigGroup,
}

impl ConfigUpdate {
    /// Encode the update
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode raw config update bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes)
            .map_err(|e| ChannelError::parse(format!("malformed config update: {e}")))
    }
}

/// Kind of element changed by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeltaKind {
    /// Configuration group
    Group,
    /// Configuration value
    Value,
    /// Policy slot
    Policy,
}

/// One element the write set changes relative to the read set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    /// Slash-separated path from the root group
    pub path: String,
    /// Element kind
    pub kind: DeltaKind,
    /// Version written
    pub version: u64,
}

/// Immutable parsed config update plus its canonical signing bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfigUpdate {
    update: ConfigUpdate,
    bytes: Vec<u8>,
}

impl ChannelConfigUpdate {
    /// Channel the update creates
    pub fn channel_id(&self) -> &str {
        &self.update.channel_id
    }

    /// Read set of the update
    pub fn read_set(&self) -> &ConfigGroup {
        &self.update.read_set
    }

    /// Write set of the update
    pub fn write_set(&self) -> &ConfigGroup {
        &self.update.write_set
    }

    /// Canonical bytes every signature is bound to
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Elements written at a newer version than read, or not read at all
    pub fn delta(&self) -> Vec<DeltaEntry> {
        let mut entries = Vec::new();
        collect_delta(
            ROOT_GROUP,
            Some(&self.update.read_set),
            &self.update.write_set,
            &mut entries,
        );
        entries
    }
}

fn collect_delta(
    path: &str,
    read: Option<&ConfigGroup>,
    write: &ConfigGroup,
    out: &mut Vec<DeltaEntry>,
) {
    if read.map_or(true, |r| write.version > r.version) {
        out.push(DeltaEntry {
            path: path.to_string(),
            kind: DeltaKind::Group,
            version: write.version,
        });
    }

    for (name, value) in &write.values {
        let read_version = read.and_then(|r| r.values.get(name)).map(|v| v.version);
        if read_version.map_or(true, |v| value.version > v) {
            out.push(DeltaEntry {
                path: format!("{path}/{name}"),
                kind: DeltaKind::Value,
                version: value.version,
            });
        }
    }

    for (name, policy) in &write.policies {
        let read_version = read.and_then(|r| r.policies.get(name)).map(|p| p.version);
        if read_version.map_or(true, |v| policy.version > v) {
            out.push(DeltaEntry {
                path: format!("{path}/{name}"),
                kind: DeltaKind::Policy,
                version: policy.version,
            });
        }
    }

    for (name, child) in &write.groups {
        let read_child = read.and_then(|r| r.groups.get(name));
        collect_delta(&format!("{path}/{name}"), read_child, child, out);
    }
}

/// Parses raw config-transaction envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigUpdateExtractor;

impl ConfigUpdateExtractor {
    /// Extract the config update from raw envelope bytes
    ///
    /// Pure: no I/O, no signing. Any structural problem yields
    /// [`ChannelError::Parse`].
    pub fn extract(&self, envelope_bytes: &[u8]) -> Result<ChannelConfigUpdate> {
        if envelope_bytes.is_empty() {
            return Err(ChannelError::parse("envelope is empty"));
        }

        let envelope: ConfigTxEnvelope = serde_cbor::from_slice(envelope_bytes)
            .map_err(|e| ChannelError::parse(format!("malformed envelope: {e}")))?;

        if !SUPPORTED_ENVELOPE_VERSIONS.contains(&envelope.version) {
            return Err(ChannelError::parse(format!(
                "unsupported envelope version {}",
                envelope.version
            )));
        }

        if envelope.header.kind != HeaderKind::ConfigUpdate {
            return Err(ChannelError::parse(format!(
                "envelope carries {:?}, expected ConfigUpdate",
                envelope.header.kind
            )));
        }

        if envelope.config_update.is_empty() {
            return Err(ChannelError::parse("envelope has no config update"));
        }

        let update = ConfigUpdate::decode(&envelope.config_update)?;

        if update.channel_id.is_empty() {
            return Err(ChannelError::parse("config update has no channel id"));
        }

        if update.channel_id != envelope.header.channel_id {
            return Err(ChannelError::parse(format!(
                "config update targets '{}' but envelope header names '{}'",
                update.channel_id, envelope.header.channel_id
            )));
        }

        tracing::debug!(
            channel = %update.channel_id,
            update_len = envelope.config_update.len(),
            "Extracted config update from envelope"
        );

        Ok(ChannelConfigUpdate {
            update,
            bytes: envelope.config_update,
        })
    }
}

/// Convenience wrapper around [`ConfigUpdateExtractor::extract`]
pub fn extract_channel_config(envelope_bytes: &[u8]) -> Result<ChannelConfigUpdate> {
    ConfigUpdateExtractor.extract(envelope_bytes)
}
