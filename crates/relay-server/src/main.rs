//! sentry-relay - Sentry to Google Chat webhook relay
//!
//! Receives Sentry webhooks, translates them into Google Chat messages and
//! posts them to an incoming webhook.

use clap::Parser;
use relay_server::cli::{read_input, render, Cli, Commands, LogFormat, RenderOutput};
use relay_server::{RelayConfig, RelayServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sentry_relay=info,relay_server=info,relay_translate=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match env_file {
        Ok(path) => info!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => info!("no .env file found, using process environment"),
        Err(e) => warn!(error = %e, "failed to load .env file"),
    }

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(cli.relay.to_config()).await?,
        Commands::Render { input } => {
            let raw = read_input(&input)?;
            match render(&raw, cli.relay.translator_config())? {
                RenderOutput::Message(json) => println!("{json}"),
                RenderOutput::Ignored(action) => {
                    warn!(action = %action, "action would be ignored, nothing to render");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    info!(addr = %config.bind_addr, "starting sentry-relay");

    let server = RelayServer::new(config)?;
    server.serve_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
