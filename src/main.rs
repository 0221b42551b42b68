//! phishguard native-messaging host
//!
//! Launched by the browser with the calling extension's origin as its
//! first argument; speaks length-prefixed JSON on stdin/stdout and logs
//! to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use phishguard::host::{run_host, HostBridge};
use phishguard::{
    AlertDispatcher, DedupScope, FileStateStore, Guard, GuardConfig, SecurityProbe,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "phishguard")]
#[command(author = "A3S Lab")]
#[command(version)]
#[command(about = "Phishing verdict pipeline running as a browser native-messaging host")]
struct Cli {
    /// Configuration file path (.json)
    #[arg(short, long, env = "PHISHGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Verdict service check endpoint (overrides config)
    #[arg(long, env = "PHISHGUARD_ENDPOINT")]
    endpoint: Option<String>,

    /// Protection state file (overrides config)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Keep one dedup cursor per tab instead of one for all tabs
    #[arg(long)]
    per_tab_dedup: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Origin of the calling extension, supplied by the browser
    origin: Option<String>,

    /// Parent window handle, supplied by the browser on Windows
    #[arg(long, hide = true)]
    parent_window: Option<String>,
}

fn load_config(cli: &Cli) -> Result<GuardConfig> {
    let mut config = match &cli.config {
        Some(path) => GuardConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GuardConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config.verdict_endpoint = endpoint.clone();
    }
    if let Some(path) = &cli.state_file {
        config.state_path = Some(path.clone());
    }
    if cli.per_tab_dedup {
        config.dedup_scope = DedupScope::PerTab;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("phishguard={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let state_path = config.resolved_state_path();
    tracing::info!(
        origin = cli.origin.as_deref().unwrap_or("-"),
        endpoint = %config.verdict_endpoint,
        state_path = %state_path.display(),
        dedup_scope = ?config.dedup_scope,
        "Starting phishguard host"
    );

    let (bridge, outbound) = HostBridge::channel();
    let alerts = AlertDispatcher::new(
        Arc::new(bridge.clone()),
        Arc::new(bridge.clone()),
        Arc::new(bridge.clone()),
    );
    let probe = SecurityProbe::http(&config).context("Failed to build HTTP probe")?;
    let guard = Guard::new(
        &config,
        Arc::new(FileStateStore::new(state_path)),
        probe,
        alerts,
        Arc::new(bridge),
    )
    .context("Failed to initialize guard")?;

    run_host(
        Arc::new(guard),
        tokio::io::stdin(),
        tokio::io::stdout(),
        outbound,
    )
    .await
    .context("Host session failed")?;

    Ok(())
}
