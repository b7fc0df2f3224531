mod prompt;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hookchat::composer::Composer;
use hookchat::config::{Overrides, Settings};
use hookchat::recorder::Recorder;
use hookchat::transport::{TransportConfig, WebhookClient};

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML); HOOKCHAT_* environment variables take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Webhook URL (can also be set via HOOKCHAT_ENDPOINT__URL environment variable)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Seconds to wait for a reply before giving up
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let overrides = Overrides {
        endpoint: cli.endpoint,
        timeout_secs: cli.timeout,
    };
    let settings = Settings::load_with_overrides(cli.config.as_deref(), &overrides)
        .context("Webhook URL must be provided via --endpoint, a config file or HOOKCHAT_ENDPOINT__URL")?;

    tracing::info!("Sending messages to {}", settings.endpoint.url);

    let client = WebhookClient::new(TransportConfig::from_settings(&settings))?;
    let composer = Composer::new(
        Recorder::from_settings(&settings.recorder),
        settings.limits.clone(),
    );

    let mut session = Session::new(client, composer, Box::new(CliclackPrompt::new()));
    session.start().await
}
