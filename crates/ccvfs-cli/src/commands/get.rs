use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use ccvfs_storage::path::{SEPARATOR, last_path_component};
use ccvfs_storage::{Archive, StorageConfig};
use clap::Args;
use tracing::info;

use super::extract::{output_dir, save};

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Resource names, as `NAME` or `prefix|NAME`
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Directory to write resources into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

pub fn run(args: &GetArgs, config: Option<&StorageConfig>, out: &mut dyn Write) -> Result<()> {
    let Some(config) = config else {
        bail!("No archives to search; pass a storage configuration with --config");
    };
    let search = config
        .mount()
        .context("Failed to mount configured archives")?;
    info!(archives = search.len(), "Searching mounted archives");

    let output = output_dir(&args.output)?;
    for name in &args.names {
        let mut data = Vec::new();
        search
            .open_member(name)
            .with_context(|| format!("Failed to open {name}"))?
            .read_to_end(&mut data)?;

        let member = name.rsplit('|').next().unwrap_or(name);
        let file_name = last_path_component(member, SEPARATOR);
        if file_name.is_empty() {
            bail!("Cannot derive a file name from {name:?}");
        }
        save(&output, name, file_name, &data, out)?;
    }
    Ok(())
}
