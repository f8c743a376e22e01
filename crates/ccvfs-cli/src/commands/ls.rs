use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use ccvfs_storage::{ChrootFactory, FilesystemFactory, ListMode};
use clap::Args;

#[derive(Debug, Args)]
pub struct LsArgs {
    /// Directory inside the root
    #[arg(default_value = "/")]
    pub path: String,

    /// Include hidden entries
    #[arg(short, long)]
    pub all: bool,
}

pub fn run(args: &LsArgs, root: &Path, out: &mut dyn Write) -> Result<()> {
    // Confinement needs an absolute root
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve root {}", root.display()))?;
    let Some(root) = root.to_str() else {
        bail!("Root {} is not UTF-8", root.display());
    };

    let factory = ChrootFactory::new(root)?;
    let node = factory.node_for_path(&args.path);
    if !node.exists() {
        bail!("{} does not exist", node.path());
    }

    if !node.is_directory() {
        writeln!(out, "{}", node.path())?;
        return Ok(());
    }

    for child in node.children(ListMode::All, args.all)? {
        let suffix = if child.is_directory() { "/" } else { "" };
        writeln!(out, "{}{suffix}", child.path())?;
    }
    Ok(())
}
