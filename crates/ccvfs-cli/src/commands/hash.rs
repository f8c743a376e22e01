use std::io::Write;

use anyhow::Result;
use ccvfs_crypto::hash_name;
use clap::Args;

#[derive(Debug, Args)]
pub struct HashArgs {
    /// Resource names
    #[arg(required = true)]
    pub names: Vec<String>,
}

pub fn run(args: &HashArgs, out: &mut dyn Write) -> Result<()> {
    for name in &args.names {
        writeln!(out, "0x{:04X}  {name}", hash_name(name))?;
    }
    Ok(())
}
