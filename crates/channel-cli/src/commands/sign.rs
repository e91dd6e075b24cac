//! `channelctl sign` and `channelctl verify`
//!
//! Offline signing: each organization signs the config update on its own
//! machine and hands back a hex-encoded signature record.

use super::common;
use anyhow::{Context, Result};
use channel_core::extract_channel_config;
use channel_signature::{sign_config, verify_signature, SignatureRecord};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct SignArgs {
    /// Config-transaction envelope to sign
    #[arg(short, long)]
    pub envelope: PathBuf,

    /// Organization signing
    #[arg(short, long)]
    pub org: String,

    /// Write the record here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Config-transaction envelope the records claim to cover
    #[arg(short, long)]
    pub envelope: PathBuf,

    /// JSON policy descriptor the signer set must satisfy
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Files holding hex-encoded signature records
    #[arg(required = true)]
    pub records: Vec<PathBuf>,
}

pub async fn sign(config: &Path, args: SignArgs) -> Result<()> {
    let profile = common::load_profile(config, &[])?;
    let update = extract_channel_config(&common::read_envelope(&args.envelope)?)?;
    let ctx = common::load_context(&profile, &args.org).await?;

    let record = sign_config(&update, &ctx)?;
    let encoded = record.to_hex()?;
    tracing::info!(
        channel = update.channel_id(),
        signer = %record.signer(),
        "Signed config update"
    );

    match args.out {
        Some(path) => std::fs::write(&path, format!("{encoded}\n"))
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{encoded}"),
    }
    Ok(())
}

pub fn verify(args: VerifyArgs) -> Result<()> {
    let update = extract_channel_config(&common::read_envelope(&args.envelope)?)?;
    let policy = common::load_policy(args.policy.as_deref())?;

    let records = common::read_signature_records(&args.records)?;
    for (record, path) in records.iter().zip(&args.records) {
        verify_signature(record, update.bytes())
            .with_context(|| format!("record {}", path.display()))?;
        println!("ok  {}", record.signer());
    }

    if let Some(policy) = policy {
        if !policy.is_satisfied_by(records.iter().map(SignatureRecord::signer)) {
            anyhow::bail!(
                "{} signature(s) do not satisfy the policy for '{}'",
                records.len(),
                update.channel_id()
            );
        }
        println!("policy satisfied");
    }
    Ok(())
}
