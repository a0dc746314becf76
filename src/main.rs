//! tx-gateway binary.
//!
//! Broadcasts transactions to an upstream service and tracks them until
//! they settle. See the library crate for the architecture.

use clap::Parser;
use std::path::PathBuf;

use tx_gateway::lifecycle::startup;

#[derive(Parser)]
#[command(name = "tx-gateway")]
#[command(about = "Broadcast transactions and track them until they settle", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    startup::run(cli.config.as_deref()).await?;
    Ok(())
}
