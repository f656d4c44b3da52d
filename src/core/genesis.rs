//! Genesis block construction.
//!
//! A genesis block holds a single coinbase transaction whose input script is
//! `OP_0 <extra nonce> <text>` and whose only output is empty. The header has
//! no predecessor; time, bits and nonce are the only fields a network tunes.

use crate::core::error::ParamsError;
use crate::core::params::Network;
use crate::core::script::ScriptBuilder;
use crate::core::types::*;
use crate::crypto::{hash_from_hex, hash_to_hex};

/// Header version used by every genesis block.
pub const GENESIS_VERSION: i32 = 1;

/// The coinbase half of a genesis block, shared by networks that only differ
/// in header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisTemplate {
    pub tx_time: u32,
    pub coinbase_text: &'static str,
    pub extra_nonce: i64,
}

impl GenesisTemplate {
    pub fn coinbase_script(&self) -> Vec<u8> {
        ScriptBuilder::new()
            .push_int(0)
            .push_num(self.extra_nonce)
            .push_slice(self.coinbase_text.as_bytes())
            .into_bytes()
    }

    pub fn coinbase(&self) -> Transaction {
        Transaction::new_coinbase(self.tx_time, self.coinbase_script(), vec![TxOutput::empty()])
    }

    /// Assemble the block for the given header fields.
    pub fn build(&self, time: u32, nonce: u32, bits: u32) -> Block {
        let mut block = Block {
            header: BlockHeader {
                version: GENESIS_VERSION,
                prev_hash: NULL_HASH,
                merkle_root: NULL_HASH,
                time,
                bits,
                nonce,
            },
            transactions: vec![self.coinbase()],
        };
        block.header.merkle_root = block.compute_merkle_root();
        block
    }
}

/// Build a genesis block whose coinbase and header share `timestamp`.
pub fn build_genesis(
    timestamp: u32,
    coinbase_text: &'static str,
    extra_nonce: i64,
    nonce: u32,
    bits: u32,
) -> Block {
    GenesisTemplate { tx_time: timestamp, coinbase_text, extra_nonce }.build(timestamp, nonce, bits)
}

/// Copy of `block` with new header time, nonce and bits. Transactions and
/// merkle root are untouched.
pub fn retune(block: &Block, time: u32, nonce: u32, bits: u32) -> Block {
    let mut out = block.clone();
    out.header.time = time;
    out.header.nonce = nonce;
    out.header.bits = bits;
    out
}

/// Check a genesis block against its recorded hash and merkle root.
/// Returns the identity hash on success.
pub fn verify_genesis(
    network: Network,
    block: &Block,
    expected_hash: &str,
    expected_merkle_root: &str,
) -> Result<Hash256, ParamsError> {
    let merkle_root = block.compute_merkle_root();
    if merkle_root != block.header.merkle_root {
        return Err(integrity(network, "stored merkle root", &merkle_root, &block.header.merkle_root));
    }
    check_literal(network, "genesis merkle root", expected_merkle_root, &merkle_root)?;

    let hash = block.header.hash();
    check_literal(network, "genesis hash", expected_hash, &hash)?;
    Ok(hash)
}

fn check_literal(
    network: Network,
    what: &'static str,
    expected: &str,
    actual: &Hash256,
) -> Result<(), ParamsError> {
    let parsed = hash_from_hex(expected).map_err(|e| ParamsError::ConfigurationIntegrity {
        network,
        what,
        expected: expected.to_string(),
        actual: format!("unparseable literal: {}", e),
    })?;
    if &parsed != actual {
        return Err(integrity(network, what, &parsed, actual));
    }
    Ok(())
}

fn integrity(network: Network, what: &'static str, expected: &Hash256, actual: &Hash256) -> ParamsError {
    ParamsError::ConfigurationIntegrity {
        network,
        what,
        expected: hash_to_hex(expected),
        actual: hash_to_hex(actual),
    }
}
