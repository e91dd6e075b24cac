//! In-process ordering service for tests and dry runs

use super::traits::{response_to_result, OrdererSubmitter};
use crate::service::OrderingService;
use async_trait::async_trait;
use channel_core::{ChannelCreateResult, PolicySpec, Result};
use channel_signature::ChannelCreateRequest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Submits directly to an [`OrderingService`] without touching the network
#[derive(Debug, Clone)]
pub struct MemoryOrderer {
    service: Arc<OrderingService>,
    submissions: Arc<AtomicUsize>,
}

impl MemoryOrderer {
    /// Orderer backed by a fresh service enforcing `policy`
    pub fn new(policy: PolicySpec) -> Self {
        Self::with_service(Arc::new(OrderingService::new(policy)))
    }

    /// Orderer backed by an existing service
    pub fn with_service(service: Arc<OrderingService>) -> Self {
        Self {
            service,
            submissions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backing service
    pub fn service(&self) -> &Arc<OrderingService> {
        &self.service
    }

    /// Number of submissions received
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrdererSubmitter for MemoryOrderer {
    async fn submit(&self, request: &ChannelCreateRequest) -> Result<ChannelCreateResult> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            channel = %request.channel(),
            tx_id = %request.tx_id(),
            "Submitting to in-memory orderer"
        );
        response_to_result(self.service.handle(request.envelope()).await)
    }
}
