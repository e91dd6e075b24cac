//! `channelctl serve`: a local ordering service for development networks

use super::common;
use anyhow::{Context, Result};
use channel_core::PolicySpec;
use channel_transport::{serve, OrderingService};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:7050")]
    pub listen: String,

    /// JSON channel creation policy; accepts any signer set when omitted
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Channels treated as already existing
    #[arg(long, value_delimiter = ',')]
    pub existing: Vec<String>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let policy = common::load_policy(args.policy.as_deref())?.unwrap_or_else(PolicySpec::accept_all);
    let service = Arc::new(OrderingService::new(policy));
    for channel in &args.existing {
        service.insert_existing_channel(channel).await;
    }

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    tracing::info!(addr = %listener.local_addr()?, "Ordering service listening");

    tokio::select! {
        served = serve(listener, service) => served?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutting down");
        }
    }
    Ok(())
}
