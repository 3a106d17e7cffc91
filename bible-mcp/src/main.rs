use anyhow::{Context, Result};
use bible_core::{ApiConfig, BibleClient};
use std::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod framing;
mod server;
mod tools;

use framing::{Framer, Incoming};

/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing() {
    let default = if std::env::var("BIBLE_MCP_DEBUG").ok().as_deref() == Some("1") { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::from_env();
    let client = BibleClient::from_config(&config).context("building HTTP client")?;
    info!(base = %config.base_url, "bible-mcp ready");

    let stdin = std::io::stdin();
    let mut stdin = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout();
    let mut framer = Framer::default();
    loop {
        let Some(incoming) = framer.read(&mut stdin)? else { break };
        let resp = match incoming {
            Incoming::Message(msg) => server::handle_message(&client, msg),
            Incoming::Malformed(e) => Some(server::parse_error(&e)),
            Incoming::Empty => None,
        };
        if let Some(resp) = resp {
            framer.write(&mut stdout, &resp)?;
        }
    }
    info!("stdin closed, exiting");
    Ok(())
}
