use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{double_sha256, hash_to_hex};

/// A 32-byte hash used throughout the system
pub type Hash256 = [u8; 32];

/// Null hash (all zeros) used for genesis block's prev_hash
pub const NULL_HASH: Hash256 = [0u8; 32];

/// Size of a serialized block header in bytes
pub const HEADER_SIZE: usize = 80;

/// Append a variable-length integer ("compact size") to `buf`.
pub fn write_compact_size(buf: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

// ─── Transaction Types ───────────────────────────────────────────────

/// Represents a reference to a previous transaction output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: Hash256,
    pub vout: u32,
}

impl OutPoint {
    /// The outpoint a coinbase input spends: no transaction, index `u32::MAX`.
    pub fn null() -> Self {
        OutPoint { txid: NULL_HASH, vout: u32::MAX }
    }

    pub fn is_null(&self) -> bool {
        self.txid == NULL_HASH && self.vout == u32::MAX
    }
}

/// Transaction input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxInput {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxOutput {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    /// An output carrying no value and no script.
    pub fn empty() -> Self {
        TxOutput { value: 0, script_pubkey: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }
}

/// A complete transaction. Carries its own timestamp (proof-of-stake layout).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub time: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Create a coinbase transaction with a single input carrying `script_sig`.
    pub fn new_coinbase(time: u32, script_sig: Vec<u8>, outputs: Vec<TxOutput>) -> Self {
        Transaction {
            version: 1,
            time,
            inputs: vec![TxInput {
                previous_output: OutPoint::null(),
                script_sig,
                sequence: u32::MAX,
            }],
            outputs,
            lock_time: 0,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// Consensus encoding:
    /// version || time || inputs || outputs || lock_time
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.time.to_le_bytes());

        write_compact_size(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(&input.previous_output.txid);
            buf.extend_from_slice(&input.previous_output.vout.to_le_bytes());
            write_bytes(&mut buf, &input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            write_bytes(&mut buf, &output.script_pubkey);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Compute the transaction id (double SHA-256 of the encoding)
    pub fn txid(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }
}

// ─── Block Types ─────────────────────────────────────────────────────

/// Block header
///
/// `bits` is the compact encoding of the target the header's proof-of-work
/// hash must not exceed (see `crate::pow`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_hash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Block identity hash (double SHA-256 of the header).
    pub fn hash(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }

    /// Proof-of-work hash, compared against the target during mining.
    pub fn pow_hash(&self) -> Hash256 {
        crate::pow::pow_hash(&self.serialize())
    }
}

/// A complete block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Compute the merkle root from the block's transactions
    pub fn compute_merkle_root(&self) -> Hash256 {
        if self.transactions.is_empty() {
            return NULL_HASH;
        }

        let mut hashes: Vec<Hash256> = self.transactions.iter().map(|tx| tx.txid()).collect();

        while hashes.len() > 1 {
            if hashes.len() % 2 != 0 {
                let last = hashes[hashes.len() - 1];
                hashes.push(last);
            }

            hashes = hashes
                .chunks(2)
                .map(|pair| {
                    let mut combined = [0u8; 64];
                    combined[..32].copy_from_slice(&pair[0]);
                    combined[32..].copy_from_slice(&pair[1]);
                    double_sha256(&combined)
                })
                .collect();
        }

        hashes[0]
    }

    pub fn validate_merkle_root(&self) -> bool {
        self.header.merkle_root == self.compute_merkle_root()
    }

    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block [{}] bits={:08x} time={} nonce={}",
            hash_to_hex(&self.hash()),
            self.bits,
            self.time,
            self.nonce,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(time: u32) -> Transaction {
        Transaction::new_coinbase(time, vec![0x00, 0x01, 0x2a], vec![TxOutput::empty()])
    }

    #[test]
    fn test_compact_size() {
        let mut buf = Vec::new();
        write_compact_size(&mut buf, 0xfc);
        write_compact_size(&mut buf, 0xfd);
        write_compact_size(&mut buf, 0x1_0000);
        assert_eq!(buf, vec![0xfc, 0xfd, 0xfd, 0x00, 0xfe, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_coinbase_transaction() {
        let tx = sample_tx(1);
        assert!(tx.is_coinbase());
        assert!(tx.outputs[0].is_empty());
        assert_eq!(tx.inputs[0].sequence, u32::MAX);
    }

    #[test]
    fn test_tx_encoding_layout() {
        let tx = sample_tx(0x0102_0304);
        let bytes = tx.serialize();
        // version, then time
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[4, 3, 2, 1]);
        // one input, null prevout
        assert_eq!(bytes[8], 1);
        assert_eq!(&bytes[9..41], &NULL_HASH);
        assert_eq!(&bytes[41..45], &[0xff; 4]);
        // 4 + 4 + 1 + 36 + (1 + 3) + 4 + 1 + (8 + 1) + 4
        assert_eq!(bytes.len(), 67);
    }

    #[test]
    fn test_txid_changes_with_time() {
        assert_ne!(sample_tx(1).txid(), sample_tx(2).txid());
        assert_eq!(sample_tx(1).txid(), sample_tx(1).txid());
    }

    #[test]
    fn test_header_serialization() {
        let header = BlockHeader {
            version: 1,
            prev_hash: NULL_HASH,
            merkle_root: [7u8; 32],
            time: 2,
            bits: 0x1f00ffff,
            nonce: 3,
        };
        let bytes = header.serialize();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[36..68], &[7u8; 32]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1f]);
        assert_eq!(header.hash(), double_sha256(&bytes));
    }

    #[test]
    fn test_merkle_root_single_tx() {
        let tx = sample_tx(5);
        let block = Block {
            header: BlockHeader {
                version: 1,
                prev_hash: NULL_HASH,
                merkle_root: NULL_HASH,
                time: 0,
                bits: 0,
                nonce: 0,
            },
            transactions: vec![tx.clone()],
        };
        assert_eq!(block.compute_merkle_root(), tx.txid());
        assert!(!block.validate_merkle_root());
    }

    #[test]
    fn test_merkle_root_odd_count_duplicates_last() {
        let txs = vec![sample_tx(1), sample_tx(2), sample_tx(3)];
        let mut block = Block {
            header: BlockHeader {
                version: 1,
                prev_hash: NULL_HASH,
                merkle_root: NULL_HASH,
                time: 0,
                bits: 0,
                nonce: 0,
            },
            transactions: txs.clone(),
        };
        let three = block.compute_merkle_root();
        block.transactions.push(txs[2].clone());
        assert_eq!(block.compute_merkle_root(), three);
    }
}
