//! adtstack: run ABAP Test Cockpit checks against an SAP system over ADT.
//!
//! The connection is configured through environment variables
//! (`SAP_ASHOST`, `SAP_PORT`, `SAP_USER`, `SAP_PASSWORD`, ...), see
//! [`ConnectionConfig::from_env`].

mod atc;

use std::process::ExitCode;

use adtstack_core::ConnectionConfig;
use adtstack_http::AdtConnection;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line client for the SAP ABAP Development Tools REST interface.
#[derive(Parser, Debug)]
#[command(name = "adtstack", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ABAP Test Cockpit
    #[command(subcommand)]
    Atc(atc::AtcCommand),
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConnectionConfig::from_env().context("failed to load connection configuration")?;
    init_tracing(&config.log_level)?;
    debug!(host = %config.host, port = config.port, client = %config.client, "connecting");

    let connection = AdtConnection::new(config).context("failed to create ADT connection")?;

    match cli.command {
        Command::Atc(command) => atc::run(&connection, command),
    }
}
