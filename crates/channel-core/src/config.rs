//! Network profile configuration
//!
//! The profile names the ordering endpoint, the participating organizations,
//! and the default channel. It is authored outside this toolkit and loaded
//! from TOML:
//!
//! ```toml
//! default_channel = "mychannel"
//!
//! [orderer]
//! url = "tls://localhost:7050"
//! msp_id = "OrdererMSP"
//! tls_cacerts = "crypto/orderer/tlsca.pem"
//! server_hostname = "orderer.example.com"
//!
//! [orgs.org1]
//! name = "peerOrg1"
//! msp_id = "Org1MSP"
//! ```

use crate::endpoint::{OrdererEndpoint, Scheme};
use crate::errors::{ChannelError, Result};
use crate::identifiers::{ChannelName, MspId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Ordering service entry of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererProfile {
    /// Endpoint URL, `tcp://host:port` or `tls://host:port`
    pub url: String,
    /// Orderer organization MSP id
    pub msp_id: MspId,
    /// PEM trust root for TLS
    #[serde(default)]
    pub tls_cacerts: Option<PathBuf>,
    /// Server name to verify instead of the URL host
    #[serde(default)]
    pub server_hostname: Option<String>,
}

/// Organization entry of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgProfile {
    /// Display name
    pub name: String,
    /// MSP id
    pub msp_id: MspId,
    /// Key store directory for this organization
    #[serde(default)]
    pub key_store: Option<PathBuf>,
}

/// Timing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingProfile {
    /// Deadline for TCP connect and TLS handshake
    pub connect_timeout_ms: u64,
    /// Deadline for the whole submission round-trip
    pub submit_timeout_ms: u64,
    /// Advisory wait after a successful submission
    pub settle_wait_ms: u64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            submit_timeout_ms: 30_000,
            settle_wait_ms: 5_000,
        }
    }
}

/// Complete network profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Channel used when no override is given
    pub default_channel: String,
    /// Ordering service
    pub orderer: OrdererProfile,
    /// Participating organizations, keyed by short name (`org1`, `org2`, ...)
    #[serde(default)]
    pub orgs: BTreeMap<String, OrgProfile>,
    /// Timing settings
    #[serde(default)]
    pub timing: TimingProfile,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl NetworkProfile {
    /// Parse a profile from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let profile: Self = toml::from_str(text)
            .map_err(|e| ChannelError::config(format!("invalid network profile: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a file, resolving relative paths against its directory
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChannelError::config(format!("failed to read profile {}: {e}", path.display()))
        })?;
        let mut profile = Self::from_toml_str(&text)?;
        profile.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        tracing::debug!(
            path = %path.display(),
            orgs = profile.orgs.len(),
            "Loaded network profile"
        );
        Ok(profile)
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        ChannelName::validate(&self.default_channel)
            .map_err(|e| ChannelError::config(format!("default_channel: {e}")))?;

        let endpoint = OrdererEndpoint::parse(&self.orderer.url)
            .map_err(|e| ChannelError::config(format!("orderer.url: {e}")))?;
        if endpoint.scheme() == Scheme::Tls && self.orderer.tls_cacerts.is_none() {
            return Err(ChannelError::config(format!(
                "orderer.tls_cacerts is required for TLS endpoint '{}'",
                self.orderer.url
            )));
        }
        if self.timing.submit_timeout_ms == 0 || self.timing.connect_timeout_ms == 0 {
            return Err(ChannelError::config("timeouts must be greater than 0"));
        }

        for (key, org) in &self.orgs {
            if org.msp_id.as_str().is_empty() {
                return Err(ChannelError::config(format!("orgs.{key}.msp_id is empty")));
            }
        }

        Ok(())
    }

    /// Apply a `key=value` setting (used for command-line overrides)
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "channel" => {
                ChannelName::validate(value)?;
                self.default_channel = value.to_string();
            }
            "orderer" => self.orderer.url = value.to_string(),
            "settle_wait_ms" => {
                self.timing.settle_wait_ms = value
                    .parse()
                    .map_err(|e| ChannelError::config(format!("settle_wait_ms: {e}")))?;
            }
            other => {
                return Err(ChannelError::config(format!("unknown setting '{other}'")));
            }
        }
        Ok(())
    }

    /// Handle a positional `key=value` argument such as `channel=mychannel`
    pub fn handle_positional_arg(&mut self, arg: &str) -> Result<()> {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| ChannelError::config(format!("expected key=value, got '{arg}'")))?;
        self.set_from_string(key, value)
    }

    /// Channel name, honoring an explicit override
    pub fn channel_name(&self, override_name: Option<&str>) -> Result<ChannelName> {
        ChannelName::new(override_name.unwrap_or(&self.default_channel))
    }

    /// Look up an organization by short name
    pub fn org(&self, key: &str) -> Result<&OrgProfile> {
        self.orgs
            .get(key)
            .ok_or_else(|| ChannelError::config(format!("organization '{key}' not in profile")))
    }

    /// Resolve a profile-relative path
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
