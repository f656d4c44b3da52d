//! Offline genesis nonce search.
//!
//! Used once, by hand, when a new network's genesis block is being defined.
//! Node startup never calls into this module; the `search-genesis` command is
//! the only entry point.

use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::core::types::*;
use crate::crypto::hash_to_hex;
use crate::pow;

/// Progress is logged whenever `nonce & PROGRESS_MASK == 0` (every 4096 nonces)
pub const PROGRESS_MASK: u32 = 0xFFF;

/// Whether a progress line is due at this nonce.
pub fn is_progress_point(nonce: u32) -> bool {
    nonce & PROGRESS_MASK == 0
}

/// Result of a search
#[derive(Debug)]
pub enum SearchResult {
    Found(Block),
    Cancelled { attempts: u64 },
}

/// Move the header to the next candidate. When the nonce wraps to zero the
/// time is bumped by one second instead of revisiting the same nonces.
/// Returns true on wrap.
pub fn next_candidate(header: &mut BlockHeader) -> bool {
    header.nonce = header.nonce.wrapping_add(1);
    if header.nonce == 0 {
        header.time = header.time.wrapping_add(1);
        return true;
    }
    false
}

/// Search nonces (and times, on wrap) starting from the block's current header
/// until its PoW hash is at or below `target`.
pub fn search_genesis(mut block: Block, target: &BigUint, stop: &AtomicBool) -> SearchResult {
    let start = Instant::now();
    let mut attempts: u64 = 0;

    tracing::info!(
        "Searching for genesis block from time={} nonce={} (target {}, ~{:.0} expected hashes)...",
        block.header.time,
        block.header.nonce,
        pow::target_to_hex(target),
        pow::estimated_hashes(target),
    );

    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!(
                "Genesis search stopped after {} hashes at time={} nonce={}",
                attempts,
                block.header.time,
                block.header.nonce,
            );
            return SearchResult::Cancelled { attempts };
        }

        let hash = block.header.pow_hash();
        attempts += 1;

        if pow::meets_target(&hash, target) {
            let elapsed = start.elapsed().as_secs_f64();
            tracing::info!("Genesis found after {} hashes in {:.2}s", attempts, elapsed);
            tracing::info!("  genesis.time        = {}", block.header.time);
            tracing::info!("  genesis.nonce       = {}", block.header.nonce);
            tracing::info!("  genesis.pow_hash    = {}", hash_to_hex(&hash));
            tracing::info!("  genesis.hash        = {}", hash_to_hex(&block.header.hash()));
            tracing::info!("  genesis.merkle_root = {}", hash_to_hex(&block.header.merkle_root));
            return SearchResult::Found(block);
        }

        if is_progress_point(block.header.nonce) {
            tracing::info!(
                "nonce {:08X}: hash = {} (target = {})",
                block.header.nonce,
                hash_to_hex(&hash),
                pow::target_to_hex(target),
            );
        }

        if next_candidate(&mut block.header) {
            tracing::warn!("Nonce wrapped, incrementing time to {}", block.header.time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::genesis::build_genesis;

    use std::io;
    use std::sync::{Arc, Mutex};

    fn candidate(nonce: u32, bits: u32) -> Block {
        build_genesis(1_600_000_000, "search test", 7, nonce, bits)
    }

    /// A candidate at `nonce` whose PoW hash misses `target`.
    fn missing_candidate(nonce: u32, target: &BigUint) -> Block {
        let bits = pow::target_to_compact(target);
        (0..256)
            .map(|extra| build_genesis(1_600_000_000, "search test", extra, nonce, bits))
            .find(|b| !pow::meets_target(&b.header.pow_hash(), target))
            .expect("some extra nonce misses the target")
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_progress_cadence() {
        assert!(is_progress_point(0));
        assert!(!is_progress_point(1));
        assert!(!is_progress_point(4095));
        assert!(is_progress_point(4096));
        assert!(!is_progress_point(4097));
        assert!(is_progress_point(8192));
        assert!(!is_progress_point(u32::MAX));
    }

    #[test]
    fn test_search_logs_progress_at_4096() {
        let target = pow::pow_limit(1);
        let block = missing_candidate(4096, &target);

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let stop = AtomicBool::new(false);
        let found = tracing::subscriber::with_default(subscriber, || {
            match search_genesis(block.clone(), &target, &stop) {
                SearchResult::Found(found) => found,
                SearchResult::Cancelled { .. } => panic!("should not be cancelled"),
            }
        });
        assert!(found.header.nonce > 4096);

        let out = logs.contents();
        let line = out
            .lines()
            .find(|l| l.contains("nonce 00001000:"))
            .expect("progress line at nonce 4096");
        assert!(line.contains(&hash_to_hex(&block.header.pow_hash())));
        assert!(line.contains(&pow::target_to_hex(&target)));
        // no progress line for the nonces after it
        assert_eq!(out.matches("nonce 0000").count(), 1);
    }

    #[test]
    fn test_search_wraps_nonce_into_time() {
        let target = pow::pow_limit(1);
        let block = missing_candidate(u32::MAX, &target);
        let stop = AtomicBool::new(false);
        match search_genesis(block.clone(), &target, &stop) {
            SearchResult::Found(found) => {
                assert_eq!(found.header.time, block.header.time + 1);
                assert!(found.header.nonce < PROGRESS_MASK);
                assert!(pow::meets_target(&found.header.pow_hash(), &target));
                assert_eq!(found.header.merkle_root, block.header.merkle_root);
            }
            SearchResult::Cancelled { .. } => panic!("should not be cancelled"),
        }
    }

    #[test]
    fn test_next_candidate_increments_nonce() {
        let mut header = candidate(41, 0x207fffff).header;
        assert!(!next_candidate(&mut header));
        assert_eq!(header.nonce, 42);
        assert_eq!(header.time, 1_600_000_000);
    }

    #[test]
    fn test_next_candidate_wraps_into_time() {
        let mut header = candidate(u32::MAX, 0x207fffff).header;
        assert!(next_candidate(&mut header));
        assert_eq!(header.nonce, 0);
        assert_eq!(header.time, 1_600_000_001);
    }

    #[test]
    fn test_search_trivial_target_returns_start() {
        let block = candidate(u32::MAX - 1, 0x207fffff);
        let stop = AtomicBool::new(false);
        match search_genesis(block.clone(), &pow::pow_limit(0), &stop) {
            SearchResult::Found(found) => assert_eq!(found, block),
            SearchResult::Cancelled { .. } => panic!("should not be cancelled"),
        }
    }

    #[test]
    fn test_search_meets_target() {
        let target = pow::pow_limit(8);
        let block = candidate(0, pow::target_to_compact(&target));
        let stop = AtomicBool::new(false);
        match search_genesis(block.clone(), &target, &stop) {
            SearchResult::Found(found) => {
                assert!(pow::meets_target(&found.header.pow_hash(), &target));
                assert_eq!(found.transactions, block.transactions);
                assert_eq!(found.header.merkle_root, block.header.merkle_root);
                assert_eq!(found.header.time, block.header.time);
            }
            SearchResult::Cancelled { .. } => panic!("should not be cancelled"),
        }
    }

    #[test]
    fn test_search_finds_first_passing_nonce() {
        let target = pow::pow_limit(4);
        let block = candidate(0, pow::target_to_compact(&target));
        let stop = AtomicBool::new(false);
        let found = match search_genesis(block.clone(), &target, &stop) {
            SearchResult::Found(found) => found,
            SearchResult::Cancelled { .. } => panic!("should not be cancelled"),
        };
        // every earlier nonce must have failed
        let mut header = block.header.clone();
        while header.nonce < found.header.nonce {
            assert!(!pow::meets_target(&header.pow_hash(), &target));
            next_candidate(&mut header);
        }
    }

    #[test]
    fn test_search_honours_stop_flag() {
        let block = candidate(0, 0x207fffff);
        let stop = AtomicBool::new(true);
        match search_genesis(block, &BigUint::from(0u32), &stop) {
            SearchResult::Cancelled { attempts } => assert_eq!(attempts, 0),
            SearchResult::Found(_) => panic!("stop flag ignored"),
        }
    }
}
