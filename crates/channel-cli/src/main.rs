//! channelctl - create application channels against an ordering service

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "channelctl")]
#[command(about = "Create channels from config-transaction envelopes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Network profile
    #[arg(short, long, global = true, default_value = "network.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a channel: collect signatures, submit, wait for it to settle
    Create(commands::create::CreateArgs),

    /// Sign the config update of an envelope as one organization
    Sign(commands::sign::SignArgs),

    /// Verify exported signature records against an envelope
    Verify(commands::sign::VerifyArgs),

    /// Generate and store a key pair for an organization
    Keygen(commands::keygen::KeygenArgs),

    /// Run a local ordering service on a TCP socket
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Create(args) => commands::create::run(&cli.config, args).await,
        Commands::Sign(args) => commands::sign::sign(&cli.config, args).await,
        Commands::Verify(args) => commands::sign::verify(args),
        Commands::Keygen(args) => commands::keygen::run(&cli.config, args),
        Commands::Serve(args) => commands::serve::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_create_parses_positional_overrides() {
        let cli = Cli::try_parse_from([
            "channelctl",
            "create",
            "channel=mychannel",
            "--envelope",
            "mychannel.tx",
            "--signers",
            "org1,org2",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("network.toml"));
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.overrides, vec!["channel=mychannel"]);
        assert_eq!(args.signers, vec!["org1", "org2"]);
        assert_eq!(args.submitter, "orderer");
        assert!(!args.duplicate_signatures);
    }

    #[test]
    fn test_create_accepts_offline_signatures() {
        let cli = Cli::try_parse_from([
            "channelctl",
            "create",
            "--envelope",
            "mychannel.tx",
            "--signature",
            "org1.sig",
            "-s",
            "org2.sig",
            "--signers",
            "orderer",
        ])
        .unwrap();

        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(
            args.signatures,
            vec![PathBuf::from("org1.sig"), PathBuf::from("org2.sig")]
        );
        assert_eq!(args.signers, vec!["orderer"]);
    }

    #[test]
    fn test_sign_requires_org() {
        assert!(Cli::try_parse_from(["channelctl", "sign", "--envelope", "a.tx"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "channelctl",
            "serve",
            "--listen",
            "127.0.0.1:7050",
            "-v",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
