use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use url::Url;

use feedctl::api::FeedClient;
use feedctl::app::{App, AppEvent};
use feedctl::config::Config;
use feedctl::ui;

/// Default config file path (~/.config/feedctl/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feedctl")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedctl",
    about = "Terminal client for managing feed subscriptions on a remote registry"
)]
struct Args {
    /// Registry base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the feed collection as JSON and exit (no TUI)
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if let Some(server) = args.server {
        config.server = server;
    }

    let base = Url::parse(&config.server)
        .with_context(|| format!("Invalid registry URL '{}'", config.server))?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("feedctl/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let client = FeedClient::new(http, base)?;

    if args.dump {
        let feeds = client.list().await.context("Failed to list feeds")?;
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }

    let mut app = App::new(client);

    // Load the collection once before entering the UI. A failure still
    // opens the UI: the collection stays empty and the error shows on the
    // list view, where `r` retries.
    if let Err(err) = app.list.load(&app.client).await {
        tracing::warn!(error = %err, "Initial feed load failed");
        app.list_error = Some(err.to_string());
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
