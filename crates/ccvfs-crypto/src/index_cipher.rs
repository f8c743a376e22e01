//! Rotate-and-add obfuscation of the CC archive index block.
//!
//! The index of a CC archive is stored scrambled. Byte `i` of the block is
//! decoded as `rotl2(b) + seed_i`, where the seed starts at `0xAC` and grows
//! by `0x67` per byte, all modulo 256. Encoding is the exact inverse:
//! `rotr2(b - seed_i)`.
//!
//! This is not encryption in any meaningful sense. It is reproduced bit for
//! bit so that archives written by the original games can be read, and so
//! that archives written here can be read by them.
//!
//! ## Usage
//!
//! ```rust
//! use ccvfs_crypto::index_cipher::IndexCipher;
//!
//! let plain = [0x34, 0x12, 0x64, 0x00, 0x00, 0x32, 0x00, 0x00];
//!
//! let mut block = plain;
//! IndexCipher::new().encrypt_in_place(&mut block);
//! assert_eq!(block, [0x22, 0xFF, 0xBA, 0xC7, 0x2E, 0xE0, 0xBA, 0xE0]);
//!
//! // Seed state is positional, so decoding needs a fresh cipher
//! IndexCipher::new().decrypt_in_place(&mut block);
//! assert_eq!(block, plain);
//! ```

/// Seed applied to the first byte of the index block
pub const INITIAL_SEED: u8 = 0xAC;

/// Amount the seed grows by after every byte
pub const SEED_STEP: u8 = 0x67;

/// Seed used for byte `index` of an index block.
///
/// Equivalent to `(0xAC + index * 0x67) mod 256`.
pub const fn seed_at(index: usize) -> u8 {
    let step = ((index % 256) * SEED_STEP as usize) % 256;
    ((INITIAL_SEED as usize + step) % 256) as u8
}

/// Positional index cipher.
///
/// The cipher keeps the running seed, so one instance must process the
/// block from its first byte, in order. Decrypting an encrypted block needs
/// a fresh instance.
#[derive(Debug, Clone)]
pub struct IndexCipher {
    /// Seed for the next byte
    seed: u8,
}

impl Default for IndexCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexCipher {
    /// Create a cipher positioned at the start of an index block.
    pub const fn new() -> Self {
        Self { seed: INITIAL_SEED }
    }

    /// Seed that will be applied to the next byte.
    pub const fn seed(&self) -> u8 {
        self.seed
    }

    fn next_seed(&mut self) -> u8 {
        let seed = self.seed;
        self.seed = self.seed.wrapping_add(SEED_STEP);
        seed
    }

    /// Decode the next byte of the block.
    pub fn decrypt_byte(&mut self, byte: u8) -> u8 {
        byte.rotate_left(2).wrapping_add(self.next_seed())
    }

    /// Encode the next byte of the block.
    pub fn encrypt_byte(&mut self, byte: u8) -> u8 {
        byte.wrapping_sub(self.next_seed()).rotate_right(2)
    }

    /// Decode `data` in place.
    pub fn decrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte = self.decrypt_byte(*byte);
        }
    }

    /// Encode `data` in place.
    pub fn encrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte = self.encrypt_byte(*byte);
        }
    }

    /// Decode `data` into a new buffer.
    pub fn decrypt(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&byte| self.decrypt_byte(byte)).collect()
    }

    /// Encode `data` into a new buffer.
    pub fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&byte| self.encrypt_byte(byte)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seed_progression() {
        assert_eq!(seed_at(0), 0xAC);
        assert_eq!(seed_at(1), 0x13);
        // 172 + 5 * 103 = 687, 687 mod 256 = 175
        assert_eq!(seed_at(5), 0xAF);
        assert_eq!(seed_at(5), 175);
    }

    #[test]
    fn test_seed_wraps_every_256_bytes() {
        assert_eq!(seed_at(256), seed_at(0));
        assert_eq!(seed_at(23 + 256 * 4), seed_at(23));
    }

    #[test]
    fn test_running_seed_matches_positional_seed() {
        let mut cipher = IndexCipher::new();
        for i in 0..24 {
            assert_eq!(cipher.seed(), seed_at(i), "seed mismatch at byte {i}");
            cipher.decrypt_byte(0);
        }
    }

    #[test]
    fn test_known_vector() {
        let plain = [0x34, 0x12, 0x64, 0x00, 0x00, 0x32, 0x00, 0x00];
        let encrypted = IndexCipher::new().encrypt(&plain);
        assert_eq!(encrypted, [0x22, 0xFF, 0xBA, 0xC7, 0x2E, 0xE0, 0xBA, 0xE0]);
        assert_eq!(IndexCipher::new().decrypt(&encrypted), plain);
    }

    #[test]
    fn test_zero_byte_decodes_to_seed() {
        let mut block = [0u8; 6];
        IndexCipher::new().decrypt_in_place(&mut block);
        assert_eq!(block, [0xAC, 0x13, 0x7A, 0xE1, 0x48, 0xAF]);
    }

    #[test]
    fn test_empty_block() {
        assert!(IndexCipher::new().decrypt(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn encrypt_then_decrypt_is_identity(data in prop::collection::vec(any::<u8>(), 0..600)) {
            let mut block = data.clone();
            IndexCipher::new().encrypt_in_place(&mut block);
            IndexCipher::new().decrypt_in_place(&mut block);
            prop_assert_eq!(block, data);
        }

        #[test]
        fn decrypt_then_encrypt_is_identity(data in prop::collection::vec(any::<u8>(), 0..600)) {
            let decoded = IndexCipher::new().decrypt(&data);
            prop_assert_eq!(IndexCipher::new().encrypt(&decoded), data);
        }
    }
}
