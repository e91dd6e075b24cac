//! Shared helpers for channelctl commands

use anyhow::{Context, Result};
use channel_core::{NetworkProfile, OrdererProfile, PolicySpec};
use channel_signature::{
    FileKeyStore, IdentityContext, IdentityProvider, SignatureRecord, StoreIdentityProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load the network profile and apply `key=value` overrides such as `channel=mychannel`
pub fn load_profile(path: &Path, overrides: &[String]) -> Result<NetworkProfile> {
    let mut profile = NetworkProfile::load_from_file(path)
        .with_context(|| format!("loading network profile {}", path.display()))?;
    for arg in overrides {
        profile.handle_positional_arg(arg)?;
    }
    profile.validate()?;
    Ok(profile)
}

/// Key store directory of an organization
///
/// Defaults to `keys/` next to the profile when the organization names none.
pub fn key_store_dir(profile: &NetworkProfile, org: &str) -> Result<PathBuf> {
    let org_profile = profile.org(org)?;
    let dir = org_profile
        .key_store
        .clone()
        .unwrap_or_else(|| PathBuf::from("keys"));
    Ok(profile.resolve_path(&dir))
}

/// Load the signing context enrolled for `org`
pub async fn load_context(profile: &NetworkProfile, org: &str) -> Result<IdentityContext> {
    let store = FileKeyStore::open(key_store_dir(profile, org)?)?;
    let provider = StoreIdentityProvider::new(Arc::new(store));
    provider
        .enroll(org)
        .await
        .with_context(|| format!("loading identity for '{org}'"))
}

/// Orderer entry with its trust root resolved against the profile directory
pub fn resolved_orderer(profile: &NetworkProfile) -> OrdererProfile {
    let mut orderer = profile.orderer.clone();
    orderer.tls_cacerts = orderer
        .tls_cacerts
        .as_deref()
        .map(|path| profile.resolve_path(path));
    orderer
}

/// Read an optional policy descriptor file
pub fn load_policy(path: Option<&Path>) -> Result<Option<PolicySpec>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading policy descriptor {}", path.display()))?;
    Ok(Some(PolicySpec::from_json_str(&text)?))
}

/// Read a config-transaction envelope
pub fn read_envelope(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading envelope {}", path.display()))
}

/// Read hex-encoded signature records written by `channelctl sign`
pub fn read_signature_records(paths: &[PathBuf]) -> Result<Vec<SignatureRecord>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SignatureRecord::from_hex(text.trim())
                .with_context(|| format!("decoding signature record {}", path.display()))
        })
        .collect()
}
