//! `channelctl keygen`

use super::common;
use anyhow::{bail, Result};
use channel_core::{Certificate, Identity, Role};
use channel_signature::{FileKeyStore, KeyMaterial, KeyMaterialStore, StoredCredential};
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct KeygenArgs {
    /// Organization key in the network profile
    #[arg(short, long)]
    pub org: String,

    /// Role recorded in the certificate: admin or member
    #[arg(long, default_value = "admin")]
    pub role: Role,

    /// Replace an existing credential
    #[arg(long)]
    pub force: bool,
}

pub fn run(config: &Path, args: KeygenArgs) -> Result<()> {
    let profile = common::load_profile(config, &[])?;
    let org = profile.org(&args.org)?;
    let store = FileKeyStore::open(common::key_store_dir(&profile, &args.org)?)?;

    if !args.force && store.get(&args.org)?.is_some() {
        bail!(
            "credential for '{}' already exists in {}; pass --force to replace it",
            args.org,
            store.root().display()
        );
    }

    let key = KeyMaterial::generate();
    let subject = match args.role {
        Role::Admin => format!("Admin@{}", org.msp_id),
        Role::Member => format!("User1@{}", org.msp_id),
    };
    let identity = Identity::new(
        org.msp_id.clone(),
        args.role,
        Certificate::new(subject, key.public_key()),
    );
    store.put(
        &args.org,
        StoredCredential {
            identity: identity.clone(),
            key,
        },
    )?;

    tracing::info!(org = %args.org, %identity, store = %store.root().display(), "Stored new credential");
    println!("{identity}");
    Ok(())
}
