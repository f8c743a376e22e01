use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ccvfs_formats::cc::IndexPolicy;
use ccvfs_storage::path::{SEPARATOR, last_path_component};
use ccvfs_storage::{CcArchive, CcArchiveOptions, FilesystemNode, NativeNode};
use clap::Args;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// CC archive to read
    pub archive: PathBuf,

    /// Resource names, or `#XXXX` for a raw hex ID
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Directory to write resources into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Resources are XOR-encoded
    #[arg(long)]
    pub encoded: bool,
}

/// What to look up for one command line argument
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    Name(&'a str),
    Id(u16),
}

fn parse_target(arg: &str) -> Result<Target<'_>> {
    match arg.strip_prefix('#') {
        Some(hex) => {
            let digits = hex.trim_start_matches("0x").trim_start_matches("0X");
            let id = u16::from_str_radix(digits, 16)
                .with_context(|| format!("Invalid resource ID {arg:?}"))?;
            Ok(Target::Id(id))
        }
        None => Ok(Target::Name(arg)),
    }
}

pub fn run(args: &ExtractArgs, policy: IndexPolicy, out: &mut dyn Write) -> Result<()> {
    let options = CcArchiveOptions::default()
        .with_encoding(args.encoded)
        .with_policy(policy);
    let archive = CcArchive::open_with(&args.archive, options)
        .with_context(|| format!("Failed to open {}", args.archive.display()))?;

    let output = output_dir(&args.output)?;

    for arg in &args.names {
        let (data, file_name) = match parse_target(arg)? {
            Target::Id(id) => (archive.read_by_id(id)?, format!("{id:04X}.bin")),
            Target::Name(name) => {
                let file_name = last_path_component(name, SEPARATOR);
                if file_name.is_empty() {
                    bail!("Cannot derive a file name from {name:?}");
                }
                (archive.read(name)?, file_name.to_string())
            }
        };

        save(&output, arg, &file_name, &data, out)?;
    }
    Ok(())
}

/// Create `dir` if needed and return it as a node to write under
pub(crate) fn output_dir(dir: &Path) -> Result<NativeNode> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let Some(path) = dir.to_str() else {
        bail!("Output directory {} is not UTF-8", dir.display());
    };
    Ok(NativeNode::new(path))
}

/// Atomically write one resource as `file_name` under `output` and report it
pub(crate) fn save(
    output: &NativeNode,
    resource: &str,
    file_name: &str,
    data: &[u8],
    out: &mut dyn Write,
) -> Result<()> {
    let node = output.child(file_name)?;
    let mut stream = node.create_write_stream(true)?;
    stream.write_all(data)?;
    stream.commit()?;

    debug!(resource = %resource, path = %node.path(), "Extracted");
    writeln!(out, "{resource} -> {} ({} bytes)", node.path(), data.len())?;
    Ok(())
}
