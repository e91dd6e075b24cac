//! End-to-end channel creation
//!
//! One run walks the state machine in [`crate::core`]: extract the config
//! update, collect one signature per signer in order, assemble and submit a
//! single request, then wait out the settle period. Every error ends the
//! run in `Failed` with the error as its reason. Nothing is retried.
//!
//! Signatures gathered offline (see [`SignatureRecord::to_hex`]) can be fed
//! in with [`ChannelCreationOrchestrator::run_with_signatures`]. They are
//! verified against the extracted config bytes before anything is signed.

use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::core::transitions::{self, TransitionResult};
use crate::core::CreationState;
use channel_core::{
    extract_channel_config, ChannelCreateResult, ChannelError, ChannelName, ErrorKind,
    OrdererProfile, Result, TransactionId,
};
use channel_signature::{
    verify_signature, ChannelCreateRequest, IdentityContext, SignatureCollector, SignatureRecord,
};
use channel_transport::OrdererSubmitter;
use std::sync::Arc;

/// What a finished run reports
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Terminal state, `Settled` or `Failed`
    pub state: CreationState,
    /// Submission result as seen by the caller
    pub result: ChannelCreateResult,
    /// Transaction id, once a request was assembled
    pub transaction_id: Option<TransactionId>,
    /// Signature records gathered by the run, pre-collected ones first
    pub signatures: Vec<SignatureRecord>,
    /// State the run was in when it failed
    pub failed_stage: Option<&'static str>,
    /// Signing operations attempted during the run
    pub signing_operations: usize,
}

impl RunOutcome {
    /// Whether the channel was created and the settle wait elapsed
    pub fn is_settled(&self) -> bool {
        self.state == CreationState::Settled
    }

    /// Failure reason, if the run failed
    pub fn error(&self) -> Option<&ChannelError> {
        self.state.failure()
    }
}

/// Progress of a run, updated as it goes so a failure keeps what was reached
struct RunProgress {
    state: CreationState,
    transaction_id: Option<TransactionId>,
    signatures: Vec<SignatureRecord>,
}

impl RunProgress {
    fn advance(&mut self, transition: TransitionResult) -> Result<()> {
        match transition {
            TransitionResult::Ok(next) => {
                tracing::debug!(from = %self.state, to = %next, "State transition");
                self.state = next;
                Ok(())
            }
            TransitionResult::NotEnabled(reason) => Err(ChannelError::validation(format!(
                "invalid state transition: {reason}"
            ))),
        }
    }
}

/// Drives channel-creation runs against one ordering service
pub struct ChannelCreationOrchestrator {
    orderer: Arc<dyn OrdererSubmitter>,
    profile: OrdererProfile,
    config: RunConfig,
}

impl ChannelCreationOrchestrator {
    /// Orchestrator submitting through `orderer` to the endpoint in `profile`
    pub fn new(orderer: Arc<dyn OrdererSubmitter>, profile: OrdererProfile, config: RunConfig) -> Self {
        Self {
            orderer,
            profile,
            config,
        }
    }

    /// Run settings
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Create `channel` from a raw config-transaction envelope
    ///
    /// `signers` sign in the given order; `submitter` signs the broadcast.
    pub async fn run(
        &self,
        channel: &str,
        envelope: &[u8],
        signers: &[IdentityContext],
        submitter: &IdentityContext,
    ) -> RunOutcome {
        self.run_with_cancel(channel, envelope, signers, submitter, CancelToken::never())
            .await
    }

    /// Like [`Self::run`], stopping early once `cancel` fires
    pub async fn run_with_cancel(
        &self,
        channel: &str,
        envelope: &[u8],
        signers: &[IdentityContext],
        submitter: &IdentityContext,
        cancel: CancelToken,
    ) -> RunOutcome {
        self.run_with_signatures(channel, envelope, &[], signers, submitter, cancel)
            .await
    }

    /// Create `channel` from signatures collected earlier plus live signers
    ///
    /// `collected` records come first in the request, followed by one fresh
    /// record per entry of `signers`. Either list may be empty.
    pub async fn run_with_signatures(
        &self,
        channel: &str,
        envelope: &[u8],
        collected: &[SignatureRecord],
        signers: &[IdentityContext],
        submitter: &IdentityContext,
        mut cancel: CancelToken,
    ) -> RunOutcome {
        let collector = SignatureCollector::new();
        let mut progress = RunProgress {
            state: CreationState::Init,
            transaction_id: None,
            signatures: Vec::with_capacity(collected.len() + signers.len()),
        };

        tracing::info!(
            channel,
            collected = collected.len(),
            signers = signers.len(),
            "Starting channel creation"
        );

        let driven = self
            .drive(
                &mut progress,
                &collector,
                channel,
                envelope,
                collected,
                signers,
                submitter,
                &mut cancel,
            )
            .await;

        let mut failed_stage = None;
        let result = match driven {
            Ok(result) => {
                tracing::info!(
                    channel,
                    tx_id = ?progress.transaction_id.as_ref().map(TransactionId::as_str),
                    "Channel creation settled"
                );
                result
            }
            Err(reason) => {
                tracing::error!(
                    channel,
                    state = %progress.state,
                    error = %reason,
                    "Channel creation failed"
                );
                failed_stage = Some(progress.state.name());
                let result = match reason.kind() {
                    ErrorKind::Timeout => ChannelCreateResult::timeout(reason.to_string()),
                    _ => ChannelCreateResult::failure(reason.to_string()),
                };
                if let Some(failed) = transitions::fail(&progress.state, reason).state() {
                    progress.state = failed;
                }
                result
            }
        };

        RunOutcome {
            state: progress.state,
            result,
            transaction_id: progress.transaction_id,
            signatures: progress.signatures,
            failed_stage,
            signing_operations: collector.signing_operations(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        progress: &mut RunProgress,
        collector: &SignatureCollector,
        channel: &str,
        envelope: &[u8],
        collected: &[SignatureRecord],
        signers: &[IdentityContext],
        submitter: &IdentityContext,
        cancel: &mut CancelToken,
    ) -> Result<ChannelCreateResult> {
        check_cancel(cancel, &progress.state)?;
        let config = extract_channel_config(envelope)?;
        progress.advance(transitions::config_extracted(&progress.state))?;

        let name = ChannelName::new(channel)?;
        if name.as_str() != config.channel_id() {
            return Err(ChannelError::validation(format!(
                "channel name '{name}' does not match config update channel '{}'",
                config.channel_id()
            )));
        }

        check_cancel(cancel, &progress.state)?;
        progress.advance(transitions::begin_signing(
            &progress.state,
            collected.len() + signers.len(),
        ))?;

        for record in collected {
            verify_signature(record, config.bytes())?;
            progress.signatures.push(record.clone());
            progress.advance(transitions::signature_recorded(&progress.state))?;
        }
        for ctx in signers {
            check_cancel(cancel, &progress.state)?;
            progress.signatures.push(collector.sign(&config, ctx).await?);
            progress.advance(transitions::signature_recorded(&progress.state))?;
        }

        if let Some(policy) = &self.config.policy {
            if !policy.is_satisfied_by(progress.signatures.iter().map(SignatureRecord::signer)) {
                return Err(ChannelError::policy(format!(
                    "{} signature(s) do not satisfy the channel creation policy",
                    progress.signatures.len()
                )));
            }
        }

        check_cancel(cancel, &progress.state)?;
        let mut builder = ChannelCreateRequest::builder()
            .config(config)
            .signatures(progress.signatures.iter().cloned())
            .channel_name(name.as_str())
            .orderer(self.profile.clone())
            .duplicate_signatures(self.config.duplicate_signatures);
        if let Some(policy) = &self.config.policy {
            builder = builder.policy(policy.clone());
        }
        let request = builder.build(submitter)?;
        progress.transaction_id = Some(request.tx_id().clone());
        progress.advance(transitions::ready_to_submit(&progress.state))?;

        check_cancel(cancel, &progress.state)?;
        progress.advance(transitions::submitted(&progress.state))?;
        let result = self.orderer.submit(&request).await?;

        tracing::debug!(
            channel = %name,
            settle_ms = self.config.settle_wait.as_millis() as u64,
            "Waiting for the new channel to settle"
        );
        tokio::select! {
            () = tokio::time::sleep(self.config.settle_wait) => {}
            () = cancel.cancelled() => {
                return Err(ChannelError::cancelled(progress.state.name()));
            }
        }
        progress.advance(transitions::settled(&progress.state))?;

        Ok(result)
    }
}

fn check_cancel(cancel: &CancelToken, state: &CreationState) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ChannelError::cancelled(state.name()));
    }
    Ok(())
}
