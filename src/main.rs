// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! netstudy CLI application

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "netstudy")]
#[command(about = "Networking exercises - DNS lookups and single-purpose HTTP servers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// DNS host and TXT lookups
    Lookup {
        #[command(subcommand)]
        command: cli::lookup::LookupCommands,
    },
    /// Run one of the HTTP servers
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", global = true)]
        host: String,
        #[command(subcommand)]
        command: cli::serve::ServeCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Without -v: only WARN and ERROR
    // With -v: per-request INFO lines as well
    // With RUST_LOG set: whatever it asks for
    if std::env::var("RUST_LOG").is_err() {
        use tracing_subscriber::EnvFilter;

        let filter = if cli.verbose {
            EnvFilter::new("netstudy=info")
        } else {
            EnvFilter::new("netstudy=warn")
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_target(true)
            .init();
    }

    match cli.command {
        Commands::Lookup { command } => {
            cli::lookup::execute(command).await?;
        }
        Commands::Serve { host, command } => {
            cli::serve::execute(host, command).await?;
        }
    }

    Ok(())
}
