//! Single-byte XOR encoding of archive payloads.
//!
//! Some CC archives store every resource XORed with `0x35`. Applying the
//! same key again restores the original bytes.

/// Key used by "encoded" CC archives
pub const RESOURCE_XOR_KEY: u8 = 0x35;

/// Fixed-key XOR transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorCipher {
    key: u8,
}

impl Default for XorCipher {
    fn default() -> Self {
        Self::resource()
    }
}

impl XorCipher {
    /// Create a transform with an arbitrary key.
    pub const fn new(key: u8) -> Self {
        Self { key }
    }

    /// The transform used by encoded CC archives.
    pub const fn resource() -> Self {
        Self::new(RESOURCE_XOR_KEY)
    }

    /// Key applied to every byte.
    pub const fn key(&self) -> u8 {
        self.key
    }

    /// Apply the transform in place. Encoding and decoding are the same operation.
    pub fn apply(&self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.key;
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_key() {
        let mut data = vec![0x00, 0x35, 0xFF, 0x41];
        XorCipher::resource().apply(&mut data);
        assert_eq!(data, [0x35, 0x00, 0xCA, 0x74]);
    }

    #[test]
    fn test_apply_twice_restores() {
        let original = b"Hello, Xeen!".to_vec();
        let mut data = original.clone();
        let cipher = XorCipher::default();
        cipher.apply(&mut data);
        assert_ne!(data, original);
        cipher.apply(&mut data);
        assert_eq!(data, original);
    }
}
