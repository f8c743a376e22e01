use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use ccvfs_formats::cc::CcArchiveBuilder;
use ccvfs_storage::{FilesystemNode, NativeNode};
use clap::Args;
use tracing::info;

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Archive to create
    pub output: PathBuf,

    /// Files to add; each is stored under its file name
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// XOR-encode resource data
    #[arg(long)]
    pub encoded: bool,
}

pub fn run(args: &PackArgs, out: &mut dyn Write) -> Result<()> {
    let mut builder = CcArchiveBuilder::new().with_encoding(args.encoded);

    for file in &args.files {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            bail!("Cannot derive a resource name from {}", file.display());
        };
        let data =
            std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        let id = builder
            .add(name, data)
            .with_context(|| format!("Failed to add {name}"))?;
        writeln!(out, "0x{id:04X}  {name}")?;
    }

    let Some(target) = args.output.to_str() else {
        bail!("Output path {} is not UTF-8", args.output.display());
    };
    let node = NativeNode::new(target);
    let stream = node.create_write_stream(true)?;
    let (stream, index) = builder
        .finish(stream)
        .with_context(|| format!("Failed to write {target}"))?;
    stream.commit()?;

    info!(
        path = %node.path(),
        entries = index.len(),
        encoded = args.encoded,
        "Packed archive"
    );
    Ok(())
}
