//! Ordering-service fixtures

use channel_core::{MspId, OrdererProfile, PolicySpec};
use channel_transport::{serve, OrderingService};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::identities::ORDERER_MSP;

/// Plain TCP profile for `url`
pub fn orderer_profile(url: impl Into<String>) -> OrdererProfile {
    OrdererProfile {
        url: url.into(),
        msp_id: MspId::new(ORDERER_MSP),
        tls_cacerts: None,
        server_hostname: None,
    }
}

/// Frame server on a loopback port, stopped when dropped
pub struct TestOrderer {
    /// Endpoint URL of the server
    pub url: String,
    /// Admission state behind the server
    pub service: Arc<OrderingService>,
    handle: JoinHandle<()>,
}

impl TestOrderer {
    /// Start a server enforcing `policy`
    pub async fn spawn(policy: PolicySpec) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("tcp://{}", listener.local_addr().unwrap());
        let service = Arc::new(OrderingService::new(policy));

        let server = Arc::clone(&service);
        let handle = tokio::spawn(async move {
            let _ = serve(listener, server).await;
        });

        Self {
            url,
            service,
            handle,
        }
    }

    /// Profile pointing at this server
    pub fn profile(&self) -> OrdererProfile {
        orderer_profile(self.url.clone())
    }
}

impl Drop for TestOrderer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Loopback URL with nothing listening on it
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("tcp://{addr}")
}
