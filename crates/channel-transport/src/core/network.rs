//! Network submission over TCP or TLS

use super::traits::{response_to_result, OrdererSubmitter};
use crate::frame;
use crate::tls;
use crate::types::{OrdererEndpoint, Scheme, TransportConfig};
use async_trait::async_trait;
use channel_core::{
    BroadcastEnvelope, BroadcastResponse, ChannelCreateResult, ChannelError, ErrorKind,
    OrdererProfile, Result,
};
use channel_signature::ChannelCreateRequest;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Submits to the orderer named in each request's profile
#[derive(Debug, Clone)]
pub struct NetworkOrderer {
    config: TransportConfig,
}

impl NetworkOrderer {
    /// Create an orderer client
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Transport settings
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn connect(&self, endpoint: &OrdererEndpoint) -> Result<TcpStream> {
        let authority = endpoint.authority();
        timeout(self.config.connect_timeout, TcpStream::connect(&authority))
            .await
            .map_err(|_| ChannelError::timeout("connect", millis(self.config.connect_timeout)))?
            .map_err(|e| ChannelError::transport(format!("failed to connect to {endpoint}: {e}")))
    }

    async fn exchange(
        &self,
        endpoint: &OrdererEndpoint,
        profile: &OrdererProfile,
        envelope: &BroadcastEnvelope,
    ) -> Result<BroadcastResponse> {
        match endpoint.scheme() {
            Scheme::Tcp => {
                let stream = self.connect(endpoint).await?;
                self.send_and_receive(stream, endpoint, envelope).await
            }
            Scheme::Tls => {
                let ca_path = profile.tls_cacerts.as_deref().ok_or_else(|| {
                    ChannelError::config(format!("{endpoint} requires a TLS trust root"))
                })?;
                let connector = tls::client_connector(ca_path)?;
                let server_name = tls::server_name(endpoint, profile.server_hostname.as_deref())?;

                let stream = self.connect(endpoint).await?;
                let stream = timeout(
                    self.config.connect_timeout,
                    connector.connect(server_name, stream),
                )
                .await
                .map_err(|_| {
                    ChannelError::timeout("TLS handshake", millis(self.config.connect_timeout))
                })?
                .map_err(|e| {
                    ChannelError::transport(format!("TLS handshake with {endpoint} failed: {e}"))
                })?;
                self.send_and_receive(stream, endpoint, envelope).await
            }
        }
    }

    async fn send_and_receive<S>(
        &self,
        mut stream: S,
        endpoint: &OrdererEndpoint,
        envelope: &BroadcastEnvelope,
    ) -> Result<BroadcastResponse>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        frame::write_frame(&mut stream, envelope)
            .await
            .map_err(|e| ChannelError::transport(format!("failed to send to {endpoint}: {e}")))?;

        // Once the request is out, an unreadable answer is a server failure.
        frame::read_frame(&mut stream, self.config.max_frame_size)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Parse => ChannelError::server(
                    "MALFORMED_RESPONSE",
                    format!("unreadable response from {endpoint}: {e}"),
                ),
                _ => ChannelError::server(
                    "NO_RESPONSE",
                    format!("no response from {endpoint}: {e}"),
                ),
            })
    }
}

#[async_trait]
impl OrdererSubmitter for NetworkOrderer {
    async fn submit(&self, request: &ChannelCreateRequest) -> Result<ChannelCreateResult> {
        let profile = request.orderer();
        let endpoint = OrdererEndpoint::parse(&profile.url)?;

        tracing::info!(
            endpoint = %endpoint,
            channel = %request.channel(),
            tx_id = %request.tx_id(),
            "Submitting channel create request"
        );

        let response = timeout(
            self.config.submit_timeout,
            self.exchange(&endpoint, profile, request.envelope()),
        )
        .await
        .map_err(|_| ChannelError::timeout("submit", millis(self.config.submit_timeout)))??;

        tracing::debug!(status = %response.status, info = %response.info, "Ordering service answered");
        response_to_result(response)
    }
}
