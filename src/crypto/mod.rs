//! Hashing helpers shared by the block types and the parameter registry.
//!
//! Hashes are kept in the byte order produced by SHA-256 (little-endian when
//! read as a 256-bit number). Human-readable hex is byte-reversed, the way
//! block explorers print block and transaction ids.

use sha2::{Digest, Sha256};

use crate::core::types::Hash256;

/// Double SHA-256.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Display form of a hash (byte-reversed hex).
pub fn hash_to_hex(hash: &Hash256) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parse the display form of a hash. Accepts an optional `0x` prefix.
pub fn hash_from_hex(s: &str) -> Result<Hash256, hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut hash = [0u8; 32];
    hex::decode_to_slice(s, &mut hash)?;
    hash.reverse();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // sha256(sha256(""))
        assert_eq!(
            hex::encode(double_sha256(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hex_is_byte_reversed() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        let s = hash_to_hex(&hash);
        assert!(s.ends_with("ab"));
        assert_eq!(hash_from_hex(&s).unwrap(), hash);
        assert_eq!(hash_from_hex(&format!("0x{}", s)).unwrap(), hash);
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!(hash_from_hex("zz").is_err());
        assert!(hash_from_hex("abcd").is_err());
    }
}
