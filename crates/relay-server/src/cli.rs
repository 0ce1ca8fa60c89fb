//! Command-line argument parsing with clap.
//!
//! Every relay setting can also come from the environment, which is how the
//! relay is usually configured when deployed.

use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use relay_translate::{normalize_payload, ActionFilter, Decision, Translator, TranslatorConfig};

use crate::config::{RelayConfig, DEFAULT_PORT};
use crate::error::{RelayError, RelayResult};

/// Sentry to Google Chat webhook relay.
#[derive(Parser, Debug, Clone)]
#[command(name = "sentry-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Relay settings.
    #[command(flatten)]
    pub relay: RelayArgs,

    /// Subcommand to execute (defaults to `serve`).
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Relay settings shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Google Chat incoming webhook URL.
    #[arg(long, env = "GCHAT_WEBHOOK", hide_env_values = true)]
    pub webhook: Option<String>,

    /// Send cards instead of plain-text messages.
    #[arg(long, env = "USE_CARDS", value_parser = BoolishValueParser::new())]
    pub use_cards: bool,

    /// Forward every issue action, not only `created`.
    #[arg(long, env = "PROCESS_ALL_ACTIONS", value_parser = BoolishValueParser::new())]
    pub all_actions: bool,

    /// Timeout for the Google Chat request, in seconds.
    #[arg(
        long,
        env = "DELIVERY_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub delivery_timeout_secs: u64,

    /// Log messages instead of posting them.
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: bool,
}

impl RelayArgs {
    /// Returns the translator settings.
    #[must_use]
    pub const fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig::new(self.use_cards, self.all_actions)
    }

    /// Builds the relay configuration.
    #[must_use]
    pub fn to_config(&self) -> RelayConfig {
        let mut config = RelayConfig::new(SocketAddr::new(self.host, self.port))
            .with_rich_cards(self.use_cards)
            .with_all_actions(self.all_actions)
            .with_delivery_timeout(Duration::from_secs(self.delivery_timeout_secs))
            .with_dry_run(self.dry_run);
        if let Some(url) = &self.webhook {
            config = config.with_webhook_url(url);
        }
        config
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the relay server.
    Serve,

    /// Translate a payload offline and print the Google Chat JSON.
    Render {
        /// Payload file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

/// Result of rendering a payload offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    /// Pretty-printed Google Chat message.
    Message(String),
    /// The action would be filtered out.
    Ignored(String),
}

/// Reads a payload from a file, or from stdin when the path is `-`.
///
/// # Errors
///
/// Returns `RelayError::Internal` if the input cannot be read.
pub fn read_input(path: &Path) -> RelayResult<String> {
    let mut raw = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| RelayError::Internal(format!("failed to read stdin: {e}")))?;
    } else {
        raw = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Internal(format!("failed to read {}: {e}", path.display())))?;
    }
    Ok(raw)
}

/// Normalizes, filters and translates a raw payload without sending it.
///
/// # Errors
///
/// Returns `RelayError::InvalidJson` or `RelayError::InvalidPayload` if the
/// payload cannot be decoded.
pub fn render(raw: &str, config: TranslatorConfig) -> RelayResult<RenderOutput> {
    let payload: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| RelayError::InvalidJson(e.to_string()))?;
    let inbound = normalize_payload(payload)?;

    if let Decision::Skip { action } =
        ActionFilter::from_config(&config).decide(inbound.action.as_deref())
    {
        return Ok(RenderOutput::Ignored(action));
    }

    let message = Translator::new(config).translate(&inbound.event);
    Ok(RenderOutput::Message(serde_json::to_string_pretty(&message)?))
}
