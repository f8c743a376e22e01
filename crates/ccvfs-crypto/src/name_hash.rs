//! Resource name hashing for CC archives
//!
//! CC archives never store file names. Every entry is keyed by a 16-bit ID
//! computed from the upper-cased resource name with a rotate-and-add hash.
//! Names of exactly four hex digits are taken as the ID itself, which lets
//! callers address resources by number.
//!
//! The rotation amount and the accumulator width must stay exactly as they
//! are: existing archives were indexed with this function.

/// ID returned for the empty name. Never matches an archive entry.
pub const INVALID_ID: u16 = 0xFFFF;

/// Map a resource name to its archive ID.
///
/// The name is upper-cased (ASCII only) before anything else, so lookups
/// are case-insensitive.
///
/// # Examples
///
/// ```
/// use ccvfs_crypto::name_hash::hash_name;
///
/// assert_eq!(hash_name("1a2b"), 0x1A2B);
/// assert_eq!(hash_name("AB"), 0x8242);
/// assert_eq!(hash_name(""), 0xFFFF);
/// ```
pub fn hash_name(name: &str) -> u16 {
    if name.is_empty() {
        return INVALID_ID;
    }

    let upper = name.to_ascii_uppercase();
    if let Some(id) = parse_hex_id(upper.as_bytes()) {
        return id;
    }

    rotate_hash(upper.as_bytes())
}

/// Parse a direct numeric reference.
///
/// Returns the value only when `name` is exactly four ASCII hex digits.
/// Signs, `0x` prefixes and whitespace are rejected.
pub fn parse_hex_id(name: &[u8]) -> Option<u16> {
    if name.len() != 4 {
        return None;
    }

    name.iter().try_fold(0u16, |acc, &b| {
        let digit = char::from(b).to_digit(16)?;
        Some((acc << 4) | digit as u16)
    })
}

/// Rotate-and-add hash over raw bytes, without case folding or hex bypass.
///
/// The accumulator starts at the first byte. For every following byte the
/// low 16 bits are rotated right by 7 and the byte is added. Hashing stops
/// at the first NUL, mirroring how the names were hashed as C strings.
pub fn rotate_hash(data: &[u8]) -> u16 {
    let Some((&first, rest)) = data.split_first() else {
        return INVALID_ID;
    };

    let mut total = u32::from(first);
    for &byte in rest.iter().take_while(|&&b| b != 0) {
        total = ((total & 0x007F) << 9) | ((total & 0xFF80) >> 7);
        total += u32::from(byte);
    }

    // The sum after the last addition may carry into bit 16
    total as u16
}
