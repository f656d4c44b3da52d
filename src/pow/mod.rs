//! Proof-of-work targets.
//!
//! A target is a 256-bit unsigned number; a header is valid when its PoW hash,
//! read as a little-endian 256-bit number, is not greater than the target.
//! Headers carry the target in "compact" form:
//!
//!   bits = size << 24 | mantissa
//!   target = mantissa * 256^(size - 3)
//!
//! where `size` is the byte length of the target and the mantissa holds its
//! top three bytes. Bit 0x00800000 is a sign bit, so a mantissa that would set
//! it is shifted down one byte and `size` grows by one.
//!
//! The PoW hash is BLAKE3 over the serialized header. The block identity hash
//! stays double SHA-256 (`BlockHeader::hash`).

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::core::types::Hash256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Compute the proof-of-work hash for serialized header bytes.
pub fn pow_hash(header_bytes: &[u8]) -> Hash256 {
    *blake3::hash(header_bytes).as_bytes()
}

/// The largest 256-bit number shifted right by `shift` bits (`~uint256(0) >> shift`).
pub fn pow_limit(shift: u32) -> BigUint {
    ((BigUint::one() << 256u32) - BigUint::one()) >> shift
}

/// Encode a target in compact form. Precision below the top three bytes is lost.
pub fn target_to_compact(target: &BigUint) -> u32 {
    let mut size = ((target.bits() + 7) / 8) as u32;
    let mut mantissa = if size <= 3 {
        (target << (8 * (3 - size))).to_u32().unwrap_or(0)
    } else {
        (target >> (8 * (size - 3))).to_u32().unwrap_or(0)
    };

    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        size += 1;
    }

    (size << 24) | mantissa
}

/// Decode a compact target. Returns `None` for negative or overflowing encodings.
pub fn compact_to_target(bits: u32) -> Option<BigUint> {
    let size = bits >> 24;
    let mantissa = bits & MANTISSA_MASK;

    if mantissa != 0 && bits & SIGN_BIT != 0 {
        return None;
    }

    let target = if size <= 3 {
        BigUint::from(mantissa >> (8 * (3 - size)))
    } else {
        BigUint::from(mantissa) << (8 * (size - 3))
    };

    if target.bits() > 256 {
        return None;
    }
    Some(target)
}

/// Read a hash as a little-endian 256-bit number.
pub fn hash_to_uint(hash: &Hash256) -> BigUint {
    BigUint::from_bytes_le(hash)
}

/// Check if a hash meets a target.
pub fn meets_target(hash: &Hash256, target: &BigUint) -> bool {
    hash_to_uint(hash) <= *target
}

/// Zero-padded 64-digit hex of a target, most significant digit first.
pub fn target_to_hex(target: &BigUint) -> String {
    format!("{:064x}", target)
}

/// Average number of hashes needed to meet `target`: 2^256 / (target + 1).
pub fn estimated_hashes(target: &BigUint) -> f64 {
    let space = BigUint::one() << 256u32;
    let denom = target + BigUint::one();
    space.to_f64().unwrap_or(f64::INFINITY) / denom.to_f64().unwrap_or(f64::INFINITY)
}
