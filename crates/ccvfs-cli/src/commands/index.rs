use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use ccvfs_formats::cc::constants::ENTRY_SIZE;
use ccvfs_formats::cc::{ArchiveIndex, IndexPolicy};
use ccvfs_storage::{CcArchive, CcArchiveOptions};
use clap::Args;
use tracing::info;

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// CC archive to read
    pub archive: PathBuf,

    /// List every stored record with its scrambled on-disk bytes,
    /// including records the index policy would skip
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: &IndexArgs, policy: IndexPolicy, out: &mut dyn Write) -> Result<()> {
    let archive = CcArchive::open_with(
        &args.archive,
        CcArchiveOptions::default().with_policy(policy),
    )
    .with_context(|| format!("Failed to open {}", args.archive.display()))?;
    let index = archive.index();

    if args.raw {
        write_raw(args, out)?;
    } else {
        for entry in index {
            writeln!(out, "0x{:04X} {:>8} {:>6}", entry.id, entry.offset, entry.size)?;
        }
    }

    info!(
        archive = %args.archive.display(),
        entries = index.len(),
        "Listed index"
    );
    Ok(())
}

fn write_raw(args: &IndexArgs, out: &mut dyn Write) -> Result<()> {
    let file = File::open(&args.archive)
        .with_context(|| format!("Failed to open {}", args.archive.display()))?;
    let block = ArchiveIndex::read_block(&mut BufReader::new(file))?;
    let records = ArchiveIndex::decode_records(&block)?;

    for (record, stored) in records.iter().zip(block.chunks_exact(ENTRY_SIZE)) {
        write!(
            out,
            "0x{:04X} {:>8} {:>6}  {}",
            record.id,
            record.offset,
            record.size,
            hex::encode(stored)
        )?;
        if !record.is_valid() {
            write!(out, "  corrupt")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use ccvfs_crypto::IndexCipher;
    use ccvfs_formats::cc::CcArchiveBuilder;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_index_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GAME.CC");
        let mut image = vec![0x01, 0x00, 0x22, 0xFF, 0xBA, 0xC7, 0x2E, 0xE0, 0xBA, 0xE0];
        image.resize(150, 0);
        fs::write(&path, image).unwrap();

        let args = IndexArgs {
            archive: path,
            raw: true,
        };
        let mut out = Vec::new();
        run(&args, IndexPolicy::Strict, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0x1234      100     50  22ffbac72ee0bae0\n"
        );
    }

    #[test]
    fn test_missing_archive() {
        let dir = TempDir::new().unwrap();
        let args = IndexArgs {
            archive: dir.path().join("none.cc"),
            raw: false,
        };
        let err = run(&args, IndexPolicy::Strict, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("none.cc"));
    }

    #[test]
    fn test_raw_dump_shows_stored_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("BAD.CC");
        let mut builder = CcArchiveBuilder::new();
        builder.add_id(0x0001, b"a".to_vec()).unwrap();
        builder.add_id(0x0002, b"b".to_vec()).unwrap();
        builder.add_id(0x0003, b"c".to_vec()).unwrap();
        let mut bytes = builder.to_bytes().unwrap();

        // Set the pad byte of the middle record
        let block = &mut bytes[2..2 + 3 * ENTRY_SIZE];
        IndexCipher::new().decrypt_in_place(block);
        block[ENTRY_SIZE + 7] = 0x01;
        IndexCipher::new().encrypt_in_place(block);
        fs::write(&path, &bytes).unwrap();

        let args = IndexArgs {
            archive: path.clone(),
            raw: true,
        };
        assert!(run(&args, IndexPolicy::Strict, &mut Vec::new()).is_err());

        let mut out = Vec::new();
        run(&args, IndexPolicy::SkipCorrupt, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("  corrupt"));
        for (position, line) in lines.iter().enumerate() {
            let start = 2 + position * ENTRY_SIZE;
            assert!(line.contains(&hex::encode(&bytes[start..start + ENTRY_SIZE])));
        }

        let plain = IndexArgs {
            archive: path,
            raw: false,
        };
        let mut out = Vec::new();
        run(&plain, IndexPolicy::SkipCorrupt, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }
}
