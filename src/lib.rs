//! Blackstar chain parameters.
//!
//! Builds the immutable per-network configuration (magic bytes, ports, limits,
//! genesis block, address prefixes, bootstrap seeds) and tracks which network
//! the process runs on.

pub mod core;
pub mod crypto;
pub mod miner;
pub mod network;
pub mod pow;
