//! `ccvfs` command line tool.
//!
//! Thin wrapper around the ccvfs libraries that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Loads the optional storage configuration
//! 4. Runs the requested subcommand
//!
//! The configuration's index policy applies to every command that opens an
//! archive. Its mounted archives are searched by `get`, and its root
//! confines `ls` unless `--root` overrides it.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ccvfs_storage::StorageConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(
    name = "ccvfs",
    about = "Inspect, extract and build CC resource archives",
    version
)]
struct Cli {
    /// Directory that filesystem commands are confined to
    #[arg(long, global = true, env = "CCVFS_ROOT")]
    root: Option<PathBuf>,

    /// Storage configuration file (JSON)
    #[arg(short, long, global = true, env = "CCVFS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "CCVFS_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the resource ID each name hashes to
    Hash(commands::hash::HashArgs),

    /// Dump the decoded index of a CC archive
    Index(commands::index::IndexArgs),

    /// Extract resources from a CC archive
    Extract(commands::extract::ExtractArgs),

    /// Extract resources from the archives mounted by the configuration
    Get(commands::get::GetArgs),

    /// Build a CC archive from files
    Pack(commands::pack::PackArgs),

    /// List a directory inside the root
    Ls(commands::ls::LsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut config = cli
        .config
        .as_deref()
        .map(StorageConfig::load)
        .transpose()
        .context("Failed to load storage configuration")?;
    if let (Some(config), Some(root)) = (config.as_mut(), cli.root.as_ref()) {
        config.root.clone_from(root);
    }
    let policy = config
        .as_ref()
        .map(|c| c.index_policy)
        .unwrap_or_default();
    let root = config
        .as_ref()
        .map(|c| c.root.clone())
        .or(cli.root)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Hash(args) => commands::hash::run(&args, &mut out),
        Commands::Index(args) => commands::index::run(&args, policy, &mut out),
        Commands::Extract(args) => commands::extract::run(&args, policy, &mut out),
        Commands::Get(args) => commands::get::run(&args, config.as_ref(), &mut out),
        Commands::Pack(args) => commands::pack::run(&args, &mut out),
        Commands::Ls(args) => commands::ls::run(&args, &root, &mut out),
    }
}
