//! Submission trait

use async_trait::async_trait;
use channel_core::{
    BroadcastResponse, BroadcastStatus, ChannelCreateResult, ChannelError, Result,
};
use channel_signature::ChannelCreateRequest;

/// Submits a signed channel-creation request to an ordering service
///
/// Exactly one submission per call; implementations never retry. An `Ok`
/// result is always a success, every rejection is an error.
#[async_trait]
pub trait OrdererSubmitter: Send + Sync {
    /// Submit the request and wait for the ordering service's answer
    async fn submit(&self, request: &ChannelCreateRequest) -> Result<ChannelCreateResult>;
}

/// Map an ordering-service response onto the submission outcome
pub fn response_to_result(response: BroadcastResponse) -> Result<ChannelCreateResult> {
    match response.status {
        BroadcastStatus::Success => Ok(ChannelCreateResult::success()),
        BroadcastStatus::Forbidden => Err(ChannelError::policy(format!(
            "ordering service refused the creation policy: {}",
            response.info
        ))),
        status => Err(ChannelError::server(status.as_str(), response.info)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_response_mapping() {
        assert!(response_to_result(BroadcastResponse::success())
            .unwrap()
            .is_success());

        assert_matches!(
            response_to_result(BroadcastResponse::rejected(BroadcastStatus::Forbidden, "no")),
            Err(ChannelError::Policy { .. })
        );

        assert_matches!(
            response_to_result(BroadcastResponse::rejected(BroadcastStatus::BadRequest, "bad")),
            Err(ChannelError::Server { status, .. }) if status == "BAD_REQUEST"
        );
    }
}
