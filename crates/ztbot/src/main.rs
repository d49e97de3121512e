//! ztbot -- Telegram bot for administering a ZeroTier network.
//!
//! Wires the config, role store, ZeroTier client, and command router from
//! `ztbot-core` to the Telegram long-polling transport.

mod config;
mod poller;
mod telegram;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ztbot_core::access::{AccessStore, FileRoleStore};
use ztbot_core::commands::Router;
use ztbot_core::zerotier::ZeroTierApi;

use crate::telegram::TelegramApi;

/// Telegram bot for administering a ZeroTier network.
#[derive(Parser, Debug)]
#[command(name = "ztbot", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let Some(config_path) = cli.config else {
        anyhow::bail!(
            "no config file given. Create one such as the following (fill ALL empty strings):\n{}",
            config::sample()
        );
    };

    let cfg = config::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let store = Arc::new(
        FileRoleStore::load(&cfg.roles_file, cfg.admin_id)
            .with_context(|| format!("loading role store {}", cfg.roles_file.display()))?,
    );
    let zt_api = ZeroTierApi::new(&cfg.zt_token, &cfg.zt_network)
        .context("building ZeroTier client")?;
    let router = Arc::new(Router::new(zt_api, store as Arc<dyn AccessStore>));
    let tg_api = Arc::new(TelegramApi::new(&cfg.bot_token).context("building Telegram client")?);

    info!(network = %cfg.zt_network, "ztbot starting");

    poller::run(tg_api, router, cfg.poll_timeout_secs).await;

    Ok(())
}
