#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for CC archive parsing and building
//!
//! Covers a hand-assembled archive image with a known scrambled index,
//! archives produced by the builder, and index rebuilding with relocated
//! offsets.

use ccvfs_crypto::{XorCipher, hash_name};
use ccvfs_formats::CcFormat;
use ccvfs_formats::cc::{ArchiveIndex, CcArchiveBuilder, IndexPolicy, constants};
use pretty_assertions::assert_eq;
use std::io::Cursor;

/// One-entry archive: ID 0x1234, 50 bytes at offset 100, gap filled with 0xEE
fn known_image() -> Vec<u8> {
    let mut image = vec![0x01, 0x00, 0x22, 0xFF, 0xBA, 0xC7, 0x2E, 0xE0, 0xBA, 0xE0];
    image.resize(100, 0xEE);
    image.extend((0u8..50).map(|b| b.wrapping_mul(3)));
    image
}

fn slice<'a>(image: &'a [u8], index: &ArchiveIndex, id: u16) -> &'a [u8] {
    let entry = index.find(id).unwrap_or_else(|| panic!("missing id {id:#06x}"));
    &image[entry.offset as usize..entry.end() as usize]
}

// --- Known image ---

#[test]
fn known_image_decodes() {
    let image = known_image();
    let index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();

    assert_eq!(index.len(), 1);
    let entry = index.find(0x1234).unwrap();
    assert_eq!((entry.offset, entry.size), (100, 50));

    let expected: Vec<u8> = (0u8..50).map(|b| b.wrapping_mul(3)).collect();
    assert_eq!(slice(&image, &index, 0x1234), expected.as_slice());
}

#[test]
fn known_image_index_round_trips() {
    let image = known_image();
    ArchiveIndex::verify_round_trip(&image[..10]).unwrap();
}

#[test]
fn known_image_misses_other_ids() {
    let image = known_image();
    let index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();
    assert!(!index.contains(0x4321));
    assert!(index.find(hash_name("1234")).is_some());
}

// --- Builder output ---

#[test]
fn builder_archive_reads_back() {
    let resources: [(&str, &[u8]); 3] = [
        ("MAZE.PAL", b"palette"),
        ("intro.voc", b"voice data here"),
        ("spells.xen", b""),
    ];

    let mut builder = CcArchiveBuilder::new();
    for (name, data) in resources {
        builder.add(name, data).unwrap();
    }
    let (image, written) = builder.finish(Vec::new()).unwrap();

    let index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();
    assert_eq!(index.entries(), written.entries());
    assert_eq!(
        index.iter().next().map(|e| e.offset as usize),
        Some(constants::data_start(3))
    );

    for (name, data) in resources {
        assert_eq!(slice(&image, &index, hash_name(name)), data, "{name}");
    }
    let total: usize = resources.iter().map(|(_, d)| d.len()).sum();
    assert_eq!(image.len(), constants::data_start(3) + total);
}

#[test]
fn encoded_builder_archive_reads_back() {
    let mut builder = CcArchiveBuilder::new().with_encoding(true);
    builder.add("ROSTER.DAT", b"party of six".to_vec()).unwrap();
    let image = builder.to_bytes().unwrap();

    let index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();
    let mut payload = slice(&image, &index, hash_name("roster.dat")).to_vec();
    assert_ne!(payload, b"party of six");

    XorCipher::resource().apply(&mut payload);
    assert_eq!(payload, b"party of six");
}

#[test]
fn hex_literal_names_keep_their_id() {
    let mut builder = CcArchiveBuilder::new();
    let id = builder.add("0a1F", vec![9]).unwrap();
    assert_eq!(id, 0x0A1F);

    let image = builder.to_bytes().unwrap();
    let index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();
    assert!(index.contains(0x0A1F));
}

// --- Rebuilding ---

#[test]
fn relocated_index_moves_data() {
    let image = known_image();
    let mut index = ArchiveIndex::parse(&mut Cursor::new(&image), IndexPolicy::Strict).unwrap();

    // Drop the gap: data follows the index immediately
    let end = index.relocate_packed().unwrap();
    assert_eq!(end, 10 + 50);

    let mut rebuilt = index.encode().unwrap();
    for entry in &index {
        rebuilt.extend_from_slice(&image[entry.offset as usize..entry.end() as usize]);
    }

    let reread = ArchiveIndex::parse(&mut Cursor::new(&rebuilt), IndexPolicy::Strict).unwrap();
    assert_eq!(reread.find(0x1234).unwrap().offset, 10);
    assert_eq!(
        slice(&rebuilt, &reread, 0x1234),
        slice(&image, &index, 0x1234)
    );
}
