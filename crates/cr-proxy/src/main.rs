use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod server;
mod settings;

use server::Server;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(version, about = "Proxy between the Clash Royale API and the stats dashboard")]
struct Args {
    /// Path to the JSON settings file
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(PathBuf),
        default_value = "config.json"
    )]
    config: PathBuf,
    /// Address to listen on, overriding the settings file
    #[arg(short, long)]
    listen: Option<SocketAddr>,
    /// Also send logs to journald
    #[arg(long)]
    journald: bool,
}

fn init_tracing(journald: bool) -> Result<()> {
    let journald = if journald {
        Some(tracing_journald::layer().context("Failed to connect to journald")?)
    } else {
        None
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(journald)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.journald)?;

    let mut settings = Settings::load(&args.config)?;
    if let Some(listen) = args.listen {
        settings.listen_addr = listen;
    }
    info!(?settings, "Loaded settings");

    let api = cr_api::Api::new(
        &settings.api_key()?,
        &settings.base_url,
        settings.request_timeout,
    )?;
    let server = Server::new(api, &settings)?;

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down");
        shutdown.cancel();
    });

    server.start(token).await
}
