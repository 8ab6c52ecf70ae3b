use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edgekeeper::{load_proxies, load_wallets, Runner};

#[derive(Parser, Debug)]
#[command(author, version, about = "Keeps LayerEdge light nodes checked in and running")]
struct Args {
    /// JSON file with address/private-key pairs
    #[arg(short, long, default_value = "wallets.json")]
    wallets: PathBuf,

    /// Text file with one proxy URI per line (http://, socks4://, socks5://)
    #[arg(short, long, default_value = "proxies.txt")]
    proxies: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify an invite code and register every wallet under it
    Register {
        /// Referral/invite code
        code: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let wallets = load_wallets(&args.wallets)?;
    info!(count = wallets.len(), "loaded wallets");

    let proxies = load_proxies(&args.proxies)?;
    if !proxies.is_empty() {
        info!(count = proxies.len(), "loaded proxies");
    }

    let runner = Runner::new(wallets, proxies)?;
    match args.command {
        Some(Command::Register { code }) => runner.register_all(&code).await?,
        None => runner.run().await?,
    }
    Ok(())
}
