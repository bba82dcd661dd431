mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use savory_core::store::Store;

#[derive(Parser)]
#[command(
    name = "savory",
    version,
    about = "A recipe discovery catalog served over a REST API"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Start with an empty catalog instead of the sample data
        #[arg(long)]
        no_seed: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            port,
            bind,
            no_seed,
        } => {
            let store = if no_seed {
                Store::new()
            } else {
                Store::with_sample_data()
            };
            server::start_server(store, port, &bind).await
        }
    }
}
