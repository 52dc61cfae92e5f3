// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! DNS lookup commands

use anyhow::{Context, Result};
use clap::Subcommand;
use netstudy::constants::{HOST_LOOKUP_NAME, TXT_LOOKUP_NAME};
use netstudy::LookupKind;

#[derive(Subcommand)]
pub enum LookupCommands {
    /// Resolve a host name to its addresses
    Host {
        /// Name to resolve
        #[arg(default_value = HOST_LOOKUP_NAME)]
        name: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the TXT records of a domain
    Txt {
        /// Domain to query
        #[arg(default_value = TXT_LOOKUP_NAME)]
        name: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn execute(command: LookupCommands) -> Result<()> {
    let (kind, name, json) = match command {
        LookupCommands::Host { name, json } => (LookupKind::Host, name, json),
        LookupCommands::Txt { name, json } => (LookupKind::Txt, name, json),
    };

    let resolver = netstudy::system_resolver();
    let report = netstudy::lookup::lookup(&resolver, kind, &name).await;

    // A failed lookup is printed, never turned into a failing exit status
    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize lookup report")?;
        println!("{}", rendered);
    } else {
        println!("{}", report);
    }

    Ok(())
}
