//! `channelctl create`

use super::common;
use anyhow::{bail, Result};
use channel_protocol::{cancellation, ChannelCreationOrchestrator, RunConfig};
use channel_transport::{NetworkOrderer, TransportConfig};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct CreateArgs {
    /// Profile overrides such as `channel=mychannel`
    pub overrides: Vec<String>,

    /// Config-transaction envelope produced by the configuration tool
    #[arg(short, long)]
    pub envelope: PathBuf,

    /// JSON policy descriptor checked before submitting
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Signature records produced offline with `channelctl sign`
    #[arg(short, long = "signature")]
    pub signatures: Vec<PathBuf>,

    /// Organizations whose admins sign now, after any `--signature` records
    #[arg(long, value_delimiter = ',', default_value = "org1,org2,orderer")]
    pub signers: Vec<String>,

    /// Organization whose identity signs the broadcast
    #[arg(long, default_value = "orderer")]
    pub submitter: String,

    /// Send every signature twice
    #[arg(long)]
    pub duplicate_signatures: bool,
}

pub async fn run(config: &Path, args: CreateArgs) -> Result<()> {
    let profile = common::load_profile(config, &args.overrides)?;
    let channel = profile.channel_name(None)?;
    let envelope = common::read_envelope(&args.envelope)?;
    let collected = common::read_signature_records(&args.signatures)?;

    let mut signers = Vec::with_capacity(args.signers.len());
    for org in args.signers.iter().filter(|org| !org.is_empty()) {
        signers.push(common::load_context(&profile, org).await?);
    }
    let submitter = common::load_context(&profile, &args.submitter).await?;

    let mut run_config =
        RunConfig::from_timing(&profile.timing).with_duplicate_signatures(args.duplicate_signatures);
    if let Some(policy) = common::load_policy(args.policy.as_deref())? {
        run_config = run_config.with_policy(policy);
    }

    let orderer = NetworkOrderer::new(TransportConfig::from_timing(&profile.timing))?;
    let orchestrator = ChannelCreationOrchestrator::new(
        Arc::new(orderer),
        common::resolved_orderer(&profile),
        run_config,
    );

    let (handle, token) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling channel creation");
            handle.cancel();
        }
    });

    let outcome = orchestrator
        .run_with_signatures(
            channel.as_str(),
            &envelope,
            &collected,
            &signers,
            &submitter,
            token,
        )
        .await;

    let summary = serde_json::json!({
        "channel": channel.as_str(),
        "state": outcome.state,
        "status": outcome.result.status.to_string(),
        "detail": outcome.result.detail,
        "tx_id": outcome.transaction_id.as_ref().map(|id| id.as_str()),
        "signing_operations": outcome.signing_operations,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    match outcome.error() {
        Some(error) => bail!("channel creation failed: {error}"),
        None => Ok(()),
    }
}
