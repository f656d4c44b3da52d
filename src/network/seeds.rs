//! Compiled-in bootstrap peers.
//!
//! Only used for the first one or two connections; peers found through
//! address gossip take over afterwards.

use super::{DnsSeed, SeedSpec};

pub const MAIN_SEEDS: &[SeedSpec] = &[
    SeedSpec::v4(192, 0, 2, 10, 16878),
    SeedSpec::v4(192, 0, 2, 41, 16878),
    SeedSpec::v4(198, 51, 100, 23, 16878),
    SeedSpec::v4(203, 0, 113, 5, 16878),
    SeedSpec::v6([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01], 16878),
];

pub const TEST_SEEDS: &[SeedSpec] = &[
    SeedSpec::v4(192, 0, 2, 77, 16879),
    SeedSpec::v6([0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02], 16879),
];

pub const MAIN_DNS_SEEDS: &[DnsSeed] = &[
    DnsSeed { name: "blackstar.network", host: "seed.blackstar.network" },
    DnsSeed { name: "blackstar.network", host: "seed2.blackstar.network" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ports_match_network() {
        assert!(MAIN_SEEDS.iter().all(|s| s.port == 16878));
        assert!(TEST_SEEDS.iter().all(|s| s.port == 16879));
    }

    #[test]
    fn test_v4_seeds_are_mapped() {
        let s = MAIN_SEEDS[0];
        assert_eq!(&s.addr[..12], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff]);
        assert_eq!(&s.addr[12..], &[192, 0, 2, 10]);
    }
}
