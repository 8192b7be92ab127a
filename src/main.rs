//! Brocade registry CLI.
//!
//! Command-line surface over the file-backed registry: read settings by key,
//! persist them, and inspect the backing file.

use std::collections::BTreeMap;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brocade_registry::Registry;

/// Brocade registry CLI.
#[derive(Parser)]
#[command(name = "brocade-registry")]
#[command(about = "File-backed key-value registry for Brocade settings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get { key: String },

    /// Store a value under a key, overwriting any existing value
    Set { key: String, value: String },

    /// Store a value under a key only when the key is not set yet
    Init { key: String, value: String },

    /// Print the full registry as JSON
    List,

    /// Print the resolved backing-file path
    Path,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut registry = Registry::new();

    match cli.command {
        Commands::Get { key } => {
            registry.load()?;
            match registry.get(&key) {
                Some(value) => println!("{value}"),
                None => bail!("key `{key}` is not set"),
            }
        }
        Commands::Set { key, value } => registry.set(&key, &value)?,
        Commands::Init { key, value } => registry.init_if_absent(&key, &value)?,
        Commands::List => {
            registry.load()?;
            // BTreeMap for stable key order in the output.
            let sorted: BTreeMap<&String, &String> = registry.values().iter().collect();
            println!("{}", serde_json::to_string_pretty(&sorted)?);
        }
        Commands::Path => println!("{}", registry.backing_file()?.display()),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
