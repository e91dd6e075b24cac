//! Channel, transaction, and organization identifiers

use crate::errors::{ChannelError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Maximum channel name length accepted by the ordering service
pub const MAX_CHANNEL_NAME_LEN: usize = 249;

/// Validated channel name
///
/// Names start with a lowercase ASCII letter followed by lowercase letters,
/// digits, `.` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Validate and wrap a channel name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Check a candidate name without allocating a `ChannelName`
    pub fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ChannelError::validation("channel name must not be empty"));
        }
        if name.len() > MAX_CHANNEL_NAME_LEN {
            return Err(ChannelError::validation(format!(
                "channel name is {} characters, maximum is {MAX_CHANNEL_NAME_LEN}",
                name.len()
            )));
        }

        let mut chars = name.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
            return Err(ChannelError::validation(format!(
                "channel name '{name}' must start with a lowercase letter"
            )));
        }
        if let Some(bad) =
            chars.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-'))
        {
            return Err(ChannelError::validation(format!(
                "channel name '{name}' contains invalid character '{bad}'"
            )));
        }

        Ok(())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

impl FromStr for ChannelName {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction identifier bound to a submitter and a one-time nonce
///
/// The id is `hex(sha256(nonce || creator))`, so two attempts by the same
/// submitter only collide if the nonce repeats.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Derive a transaction id from a nonce and the serialized creator identity
    pub fn derive(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse a transaction id from its hex form
    pub fn from_hex(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChannelError::validation(format!(
                "transaction id '{value}' is not a 32-byte hex digest"
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Get the hex form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionId {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(value)
    }
}

impl From<TransactionId> for String {
    fn from(value: TransactionId) -> Self {
        value.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membership service provider identifier of an organization
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MspId(pub String);

impl MspId {
    /// Create a new MSP id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MspId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for MspId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role an identity holds within its organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary member of the organization
    Member,
    /// Administrator of the organization
    Admin,
}

impl Role {
    /// Whether an identity holding `self` satisfies a principal requiring `required`
    ///
    /// Admins are members too; members are never admins.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::Member => true,
            Role::Admin => self == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => f.write_str("member"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(ChannelError::policy(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_channel_name_valid() {
        assert!(ChannelName::new("mychannel").is_ok());
        assert!(ChannelName::new("a.b-c9").is_ok());
    }

    #[test]
    fn test_channel_name_rejects_empty_and_bad_charset() {
        for bad in ["", "MyChannel", "9lives", "my_channel", "chan nel"] {
            let err = ChannelName::new(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad}");
        }
        assert!(ChannelName::new("a".repeat(MAX_CHANNEL_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_channel_name_serde_validates() {
        let parsed: std::result::Result<ChannelName, _> = serde_json::from_str("\"Bad\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_transaction_id_derivation() {
        let a = TransactionId::derive(b"nonce-1", b"creator");
        let b = TransactionId::derive(b"nonce-2", b"creator");
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(TransactionId::from_hex(a.as_str()).unwrap(), a);
        assert!(TransactionId::from_hex("abc").is_err());
    }

    #[test]
    fn test_role_satisfaction() {
        assert!(Role::Admin.satisfies(Role::Member));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Member.satisfies(Role::Member));
        assert!(!Role::Member.satisfies(Role::Admin));
    }
}
