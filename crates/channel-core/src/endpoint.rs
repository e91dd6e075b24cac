//! Ordering-service endpoint addresses

use crate::errors::{ChannelError, Result};
use std::fmt;
use std::str::FromStr;

/// Wire security of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain TCP
    Tcp,
    /// TCP wrapped in TLS
    Tls,
}

impl Scheme {
    fn parse(scheme: &str) -> Option<Self> {
        match scheme {
            "tcp" | "grpc" => Some(Self::Tcp),
            "tls" | "grpcs" => Some(Self::Tls),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Tls => f.write_str("tls"),
        }
    }
}

/// Parsed `scheme://host:port` endpoint
///
/// `grpc://` and `grpcs://` are accepted as aliases of `tcp://` and
/// `tls://` so existing network profiles keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrdererEndpoint {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl OrdererEndpoint {
    /// Parse an endpoint URL
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| ChannelError::config(format!("endpoint '{url}' has no scheme")))?;

        let scheme = Scheme::parse(scheme).ok_or_else(|| {
            ChannelError::config(format!("unsupported endpoint scheme '{scheme}' in '{url}'"))
        })?;

        let rest = rest.trim_end_matches('/');
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| ChannelError::config(format!("endpoint '{url}' has no port")))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(ChannelError::config(format!("endpoint '{url}' has no host")));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| ChannelError::config(format!("invalid port '{port}' in '{url}'")))?;
        if port == 0 {
            return Err(ChannelError::config(format!("port 0 is not valid in '{url}'")));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    /// Wire security
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host name or address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` form suitable for connecting
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for OrdererEndpoint {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OrdererEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}
