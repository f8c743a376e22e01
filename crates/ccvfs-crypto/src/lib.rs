//! Hashing and obfuscation primitives for CC archives
//!
//! This crate provides the small, bit-exact transforms that CC archive files
//! depend on. None of them are cryptographically meaningful; they exist only
//! because existing game data was written with them.
//!
//! # Components
//!
//! - **Name hashing**: resource name to 16-bit ID, with a hex-literal bypass
//! - **Index cipher**: rotate-and-add obfuscation of the archive index block
//! - **XOR encoding**: single-byte XOR applied to the payload of "encoded" archives
//!
//! # Examples
//!
//! ## Resource IDs
//!
//! ```
//! use ccvfs_crypto::hash_name;
//!
//! assert_eq!(hash_name("1A2B"), 0x1A2B);
//! assert_eq!(hash_name("maze.pal"), hash_name("MAZE.PAL"));
//! ```
//!
//! ## Index obfuscation
//!
//! ```
//! use ccvfs_crypto::IndexCipher;
//!
//! let mut block = vec![0x34, 0x12, 0x64, 0x00, 0x00, 0x32, 0x00, 0x00];
//! IndexCipher::new().encrypt_in_place(&mut block);
//! IndexCipher::new().decrypt_in_place(&mut block);
//! assert_eq!(block, [0x34, 0x12, 0x64, 0x00, 0x00, 0x32, 0x00, 0x00]);
//! ```

#![warn(missing_docs)]

pub mod index_cipher;
pub mod name_hash;
pub mod xor;

// Re-export commonly used types
pub use index_cipher::{IndexCipher, seed_at};
pub use name_hash::{INVALID_ID, hash_name, parse_hex_id, rotate_hash};
pub use xor::XorCipher;
