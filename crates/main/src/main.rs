/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use server::{Listener, ServerConfig};
use store::MailboxStore;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postino", about = "Store-and-forward mail delivery server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the interface to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Override the TCP port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the mailbox data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(bind) = args.bind {
        config.net.bind = bind;
    }
    if let Some(port) = args.port {
        config.net.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    config.validate().context("validating configuration")?;

    let store = Arc::new(
        MailboxStore::open(&config.storage.data_dir, &config.users)
            .await
            .context("opening mailbox store")?,
    );

    let listener = Listener::bind(config, store)
        .await
        .context("starting listener")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    listener.run(shutdown_rx).await;
    info!("server stopped");
    Ok(())
}
