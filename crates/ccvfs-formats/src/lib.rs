//! File format parsers and builders for CC resource archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate provides symmetric (parser and builder) implementations of the
//! CC archive format used by a family of early-1990s role-playing games.
//!
//! # Supported Formats
//!
//! - **CC archive**: obfuscated index block followed by raw resource data
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: Both parsing and building supported
//! - **Type Safety**: 24-bit offsets and 16-bit sizes are range checked on write
//! - **Round-Trip Guarantee**: parse(build(data)) == data

#![warn(missing_docs)]

/// CC archive index decoding, encoding and archive building
///
/// See the [`cc`] module for the binary layout and usage examples.
pub mod cc;

/// Common format trait that all formats should implement
pub trait CcFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
