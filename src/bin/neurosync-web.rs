// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! NeuroSync Web Dashboard
//!
//! Standalone web server for the NeuroSync dashboard and JSON API.

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use neurosync::coaching::Coach;
use neurosync::config::AppConfig;
use neurosync::Result;

#[derive(Parser, Debug)]
#[command(name = "neurosync-web")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "NeuroSync Web Dashboard Server")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("NeuroSync Web Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }

    let coach = Coach::from_config(&config.llm)?;
    if !coach.is_online() {
        warn!(
            "No API key in {}; coaching will use built-in content",
            config.llm.api_key_env
        );
    }

    neurosync::web::start_server(config, coach).await
}
