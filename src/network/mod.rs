use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::net::{Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod seeds;

/// One week in seconds
pub const ONE_WEEK: u64 = 7 * 24 * 60 * 60;

/// Service bit advertised by full nodes
pub const NODE_NETWORK: u64 = 1;

// ─── Seed Records ────────────────────────────────────────────────────

/// Compiled-in bootstrap peer. IPv4 peers are stored IPv6-mapped (`::ffff:a.b.c.d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSpec {
    pub addr: [u8; 16],
    pub port: u16,
}

impl SeedSpec {
    pub const fn v4(a: u8, b: u8, c: u8, d: u8, port: u16) -> Self {
        SeedSpec {
            addr: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d],
            port,
        }
    }

    pub const fn v6(addr: [u8; 16], port: u16) -> Self {
        SeedSpec { addr, port }
    }
}

/// A DNS seed: a hostname resolved at runtime for more peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DnsSeed {
    pub name: &'static str,
    pub host: &'static str,
}

// ─── Peer Addresses ──────────────────────────────────────────────────

/// A peer address as handed to the address manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetAddress {
    pub ip: Ipv6Addr,
    pub port: u16,
    pub services: u64,
    /// Last-seen time, unix seconds
    pub time: u64,
}

impl NetAddress {
    pub fn socket_addr(&self) -> SocketAddr {
        match self.ip.to_ipv4_mapped() {
            Some(v4) => SocketAddr::V4(SocketAddrV4::new(v4, self.port)),
            None => SocketAddr::V6(SocketAddrV6::new(self.ip, self.port, 0, 0)),
        }
    }
}

impl fmt::Display for NetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

// ─── Seed Materialization ────────────────────────────────────────────

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Turn seed records into peer addresses using the wall clock and thread RNG.
///
/// A new node only connects to one or two seeds; once connected it learns
/// addresses with newer timestamps. Seeds therefore get a random last-seen
/// time between one and two weeks ago so discovered peers win.
pub fn materialize_seeds(seeds: &[SeedSpec]) -> Vec<NetAddress> {
    materialize_seeds_at(seeds, unix_now(), &mut rand::thread_rng())
}

/// Same as [`materialize_seeds`] with an explicit clock and RNG.
pub fn materialize_seeds_at<R: Rng>(seeds: &[SeedSpec], now: u64, rng: &mut R) -> Vec<NetAddress> {
    seeds
        .iter()
        .map(|seed| {
            let age = ONE_WEEK + rng.gen_range(0..ONE_WEEK);
            NetAddress {
                ip: Ipv6Addr::from(seed.addr),
                port: seed.port,
                services: NODE_NETWORK,
                time: now.saturating_sub(age),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::net::Ipv4Addr;

    const NOW: u64 = 1_700_000_000;

    fn doc_v6() -> SeedSpec {
        SeedSpec::v6(
            [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01],
            16878,
        )
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(materialize_seeds_at(&[], NOW, &mut rng).is_empty());
        assert!(materialize_seeds(&[]).is_empty());
    }

    #[test]
    fn test_single_v6_seed() {
        let before = unix_now();
        let out = materialize_seeds(&[doc_v6()]);
        let after = unix_now();

        assert_eq!(out.len(), 1);
        let addr = &out[0];
        assert_eq!(addr.ip, "2001:db8::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(addr.port, 16878);
        assert_eq!(addr.services, NODE_NETWORK);
        assert!(addr.time >= before - 2 * ONE_WEEK);
        assert!(addr.time <= after - ONE_WEEK);
    }

    #[test]
    fn test_length_order_and_window() {
        let seeds: Vec<SeedSpec> = (0..200u16)
            .map(|i| SeedSpec::v4(10, 0, (i >> 8) as u8, i as u8, 1000 + i))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let out = materialize_seeds_at(&seeds, NOW, &mut rng);

        assert_eq!(out.len(), seeds.len());
        for (seed, addr) in seeds.iter().zip(&out) {
            assert_eq!(addr.ip.octets(), seed.addr);
            assert_eq!(addr.port, seed.port);
            assert!(addr.time >= NOW - 2 * ONE_WEEK);
            assert!(addr.time <= NOW - ONE_WEEK);
        }
        // Ages are jittered, not constant
        let first = out[0].time;
        assert!(out.iter().any(|a| a.time != first));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = materialize_seeds_at(&[doc_v6(), doc_v6()], NOW, &mut rng);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_clock_near_epoch_saturates() {
        let mut rng = StdRng::seed_from_u64(5);
        let out = materialize_seeds_at(&[doc_v6()], 100, &mut rng);
        assert_eq!(out[0].time, 0);
    }

    #[test]
    fn test_v4_mapped_display() {
        let mut rng = StdRng::seed_from_u64(9);
        let out = materialize_seeds_at(&[SeedSpec::v4(192, 0, 2, 10, 16878)], NOW, &mut rng);
        assert_eq!(
            out[0].socket_addr(),
            SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, 10), 16878))
        );
        assert_eq!(out[0].to_string(), "192.0.2.10:16878");

        let out = materialize_seeds_at(&[doc_v6()], NOW, &mut rng);
        assert_eq!(out[0].to_string(), "[2001:db8::1]:16878");
    }
}
