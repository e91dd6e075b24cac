//! Plain TCP frame server in front of an [`OrderingService`]
//!
//! Used for local networks and end-to-end tests of [`crate::NetworkOrderer`].

use crate::frame::{self, DEFAULT_MAX_FRAME_SIZE};
use crate::service::OrderingService;
use channel_core::{BroadcastEnvelope, BroadcastResponse, BroadcastStatus, ErrorKind, Result};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Accept connections forever, answering one broadcast frame per connection
pub async fn serve(listener: TcpListener, service: Arc<OrderingService>) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Ordering service listening");
    }

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &service).await {
                tracing::warn!(%peer, error = %e, "Connection ended with error");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, service: &OrderingService) -> Result<()> {
    let response =
        match frame::read_frame::<_, BroadcastEnvelope>(&mut stream, DEFAULT_MAX_FRAME_SIZE).await {
            Ok(envelope) => service.handle(&envelope).await,
            Err(e) if e.kind() == ErrorKind::Parse => {
                BroadcastResponse::rejected(BroadcastStatus::BadRequest, e.to_string())
            }
            Err(e) => return Err(e),
        };

    frame::write_frame(&mut stream, &response).await
}
