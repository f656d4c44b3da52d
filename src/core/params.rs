//! Blackstar Chain Parameters
//! Every consensus- and network-identifying constant is defined here.
//!
//! Main net is written out in full. Test net is main net plus an override
//! patch, and regtest is test net plus another patch. Each network ends up as
//! its own immutable `ChainParameters`; nothing is shared after construction.

use num_bigint::BigUint;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::core::error::ParamsError;
use crate::core::genesis::{retune, verify_genesis, GenesisTemplate};
use crate::core::types::*;
use crate::crypto::hash_to_hex;
use crate::network::seeds::{MAIN_DNS_SEEDS, MAIN_SEEDS, TEST_SEEDS};
use crate::network::{materialize_seeds, DnsSeed, NetAddress, SeedSpec};
use crate::pow;

// ─── Main Network Constants ──────────────────────────────────────────

/// Network magic bytes for main net
pub const MAIN_MAGIC: [u8; 4] = [0x47, 0x51, 0x5a, 0xb7];

/// Key that signs network alerts on main net
const MAIN_ALERT_PUBKEY: &str = "0440d36c509cd8f9aa785f5c5514b82b0725c40522aa1e8db8720041f0ad71239336e6217b15b5992d9ca4c490cf551c0b513fc0e780dd68c802b26b3687451278";

/// Key that signs sync checkpoints (all networks)
const CHECKPOINT_PUBKEY: &str = "04ef2f1c41b402ba75e5e1cb9e65f41fdd660490113151b47c8739d8c03a57c0edac72cd8222df8ec9798afab981868c89411fc26d902e04b08f41e57c95154885";

pub const MAIN_DEFAULT_PORT: u16 = 16878;
pub const MAIN_RPC_PORT: u16 = 16880;

/// Proof-of-work limit: `~0 >> 16`
pub const MAIN_POW_LIMIT_SHIFT: u32 = 16;

/// Proof-of-stake limit: `~0 >> 20` (never overridden)
pub const POS_LIMIT_SHIFT: u32 = 20;

/// Last height at which proof-of-work blocks are accepted on main net
pub const MAIN_LAST_POW_BLOCK: u32 = 100_000;

// ─── Genesis Constants ───────────────────────────────────────────────

/// Text embedded in the genesis coinbase
pub const GENESIS_COINBASE_TEXT: &str = "8 January 2016 Blackstar";

/// Number pushed before the text in the genesis coinbase script
pub const GENESIS_EXTRA_NONCE: i64 = 42;

/// Timestamp of the genesis coinbase transaction (2016-09-22 12:00:00 UTC)
pub const GENESIS_TX_TIME: u32 = 1_474_545_600;

/// Merkle root of the genesis block; the same on every network
pub const GENESIS_MERKLE_ROOT: &str = "8a5790b6c2cee7c282d011e0df54e799911448d5297cab8e4ed1256a539937a5";

pub const MAIN_GENESIS_TIME: u32 = 1_474_545_600;
pub const MAIN_GENESIS_NONCE: u32 = 33_072;
pub const MAIN_GENESIS_HASH: &str = "254a11b7435cd9b58161873d155a5a30a9c5cc5a39fc467e8cd2e1c4a28eb402";

// ─── Test Network Constants ──────────────────────────────────────────

/// Rarely used upper ASCII, invalid UTF-8, a large integer at any alignment.
pub const TEST_MAGIC: [u8; 4] = [0x77, 0x61, 0x79, 0x67];
const TEST_ALERT_PUBKEY: &str = "04871aed3dcaa16ce159ba09e8ddd2048a232d3da079edb02d7e3a632db807d414a1130a1cadc184eb393d5dcc2e3011215f377d637a0ba94aa04a121b9db30415";
pub const TEST_DEFAULT_PORT: u16 = 16879;
pub const TEST_RPC_PORT: u16 = 16881;
pub const TEST_POW_LIMIT_SHIFT: u32 = 16;
pub const TEST_GENESIS_NONCE: u32 = 63_044;
pub const TEST_GENESIS_HASH: &str = "962f21098c4e6458b924d2afb51b0f842a53dfcacac44ebff27a6f871dcc5d84";

/// Test net never stops accepting proof-of-work by height
pub const TEST_LAST_POW_BLOCK: u32 = 0x7fff_ffff;

// ─── Regression Test Constants ───────────────────────────────────────

pub const REGTEST_MAGIC: [u8; 4] = [0xfa, 0xbf, 0xb5, 0xda];
pub const REGTEST_DEFAULT_PORT: u16 = 22200;
pub const REGTEST_RPC_PORT: u16 = 22201;

/// `~0 >> 1`: half of all hashes pass, blocks are free to produce
pub const REGTEST_POW_LIMIT_SHIFT: u32 = 1;
pub const REGTEST_GENESIS_TIME: u32 = 1_470_000_000;
pub const REGTEST_GENESIS_NONCE: u32 = 148;
pub const REGTEST_GENESIS_HASH: &str = "4757d2b7a1f5833e96e74868cd683894e51bbc7675496d4c23781d61ff77f72b";

// ─── Network ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Main,
    #[serde(rename = "test")]
    Testnet,
    Regtest,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Main, Network::Testnet, Network::Regtest];

    pub fn id(self) -> u8 {
        match self {
            Network::Main => 0,
            Network::Testnet => 1,
            Network::Regtest => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "test",
            Network::Regtest => "regtest",
        }
    }
}

impl TryFrom<u8> for Network {
    type Error = ParamsError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Network::ALL
            .into_iter()
            .find(|n| n.id() == id)
            .ok_or_else(|| ParamsError::UnsupportedVariant(format!("network id {}", id)))
    }
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ParamsError::UnsupportedVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Address Prefixes ────────────────────────────────────────────────

/// Kinds of base58-encoded data, each with a per-network version prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base58Type {
    PubkeyAddress,
    ScriptAddress,
    SecretKey,
    ExtPublicKey,
    ExtSecretKey,
}

impl Base58Type {
    pub const ALL: [Base58Type; 5] = [
        Base58Type::PubkeyAddress,
        Base58Type::ScriptAddress,
        Base58Type::SecretKey,
        Base58Type::ExtPublicKey,
        Base58Type::ExtSecretKey,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Base58Type::PubkeyAddress => "pubkey_address",
            Base58Type::ScriptAddress => "script_address",
            Base58Type::SecretKey => "secret_key",
            Base58Type::ExtPublicKey => "ext_public_key",
            Base58Type::ExtSecretKey => "ext_secret_key",
        }
    }
}

/// Prefixes in `Base58Type::ALL` order.
pub type Base58Prefixes = [&'static [u8]; 5];

pub const MAIN_BASE58_PREFIXES: Base58Prefixes =
    [&[25], &[48], &[153], &[0x04, 0x88, 0xB2, 0x1E], &[0x04, 0x88, 0xAD, 0xE4]];

pub const TEST_BASE58_PREFIXES: Base58Prefixes =
    [&[135], &[208], &[249], &[0x04, 0x35, 0x87, 0xCF], &[0x04, 0x35, 0x83, 0x94]];

pub const REGTEST_BASE58_PREFIXES: Base58Prefixes =
    [&[60], &[122], &[239], &[0x04, 0x35, 0x87, 0xD1], &[0x04, 0x35, 0x83, 0x95]];

// ─── Chain Parameters ────────────────────────────────────────────────

/// The complete, immutable configuration of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParameters {
    network: Network,
    message_start: [u8; 4],
    alert_pubkey: Vec<u8>,
    checkpoint_pubkey: Vec<u8>,
    default_port: u16,
    rpc_port: u16,
    pow_limit: BigUint,
    pos_limit: BigUint,
    genesis: Block,
    genesis_hash: Hash256,
    base58_prefixes: Base58Prefixes,
    fixed_seeds: Vec<NetAddress>,
    dns_seeds: Vec<DnsSeed>,
    last_pow_block: u32,
    require_rpc_password: bool,
    data_dir: &'static str,
}

/// Header fields a derived network changes in the inherited genesis block,
/// with the hash the result must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisOverride {
    /// `None` keeps the base network's genesis time
    pub time: Option<u32>,
    pub nonce: u32,
    pub expected_hash: &'static str,
}

/// Fields a derived network overrides. `None` inherits the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsPatch {
    pub message_start: Option<[u8; 4]>,
    pub alert_pubkey: Option<&'static str>,
    pub default_port: Option<u16>,
    pub rpc_port: Option<u16>,
    pub pow_limit_shift: Option<u32>,
    pub genesis: Option<GenesisOverride>,
    pub base58_prefixes: Option<Base58Prefixes>,
    pub fixed_seeds: Option<&'static [SeedSpec]>,
    pub dns_seeds: Option<&'static [DnsSeed]>,
    pub last_pow_block: Option<u32>,
    pub require_rpc_password: Option<bool>,
    pub data_dir: Option<&'static str>,
}

fn decode_key(network: Network, what: &'static str, hex_key: &str) -> Result<Vec<u8>, ParamsError> {
    hex::decode(hex_key).map_err(|e| ParamsError::ConfigurationIntegrity {
        network,
        what,
        expected: "hex-encoded public key".to_string(),
        actual: e.to_string(),
    })
}

pub fn genesis_template() -> GenesisTemplate {
    GenesisTemplate {
        tx_time: GENESIS_TX_TIME,
        coinbase_text: GENESIS_COINBASE_TEXT,
        extra_nonce: GENESIS_EXTRA_NONCE,
    }
}

/// The genesis hash each network is recorded with.
pub fn recorded_genesis_hash(network: Network) -> &'static str {
    match network {
        Network::Main => MAIN_GENESIS_HASH,
        Network::Testnet => TEST_GENESIS_HASH,
        Network::Regtest => REGTEST_GENESIS_HASH,
    }
}

pub fn testnet_patch() -> ParamsPatch {
    ParamsPatch {
        message_start: Some(TEST_MAGIC),
        alert_pubkey: Some(TEST_ALERT_PUBKEY),
        default_port: Some(TEST_DEFAULT_PORT),
        rpc_port: Some(TEST_RPC_PORT),
        pow_limit_shift: Some(TEST_POW_LIMIT_SHIFT),
        genesis: Some(GenesisOverride {
            time: None,
            nonce: TEST_GENESIS_NONCE,
            expected_hash: TEST_GENESIS_HASH,
        }),
        base58_prefixes: Some(TEST_BASE58_PREFIXES),
        fixed_seeds: Some(TEST_SEEDS),
        dns_seeds: Some(&[]),
        last_pow_block: Some(TEST_LAST_POW_BLOCK),
        require_rpc_password: None,
        data_dir: Some("testnet"),
    }
}

pub fn regtest_patch() -> ParamsPatch {
    ParamsPatch {
        message_start: Some(REGTEST_MAGIC),
        default_port: Some(REGTEST_DEFAULT_PORT),
        rpc_port: Some(REGTEST_RPC_PORT),
        pow_limit_shift: Some(REGTEST_POW_LIMIT_SHIFT),
        genesis: Some(GenesisOverride {
            time: Some(REGTEST_GENESIS_TIME),
            nonce: REGTEST_GENESIS_NONCE,
            expected_hash: REGTEST_GENESIS_HASH,
        }),
        base58_prefixes: Some(REGTEST_BASE58_PREFIXES),
        fixed_seeds: Some(&[]),
        dns_seeds: Some(&[]),
        require_rpc_password: Some(false),
        data_dir: Some("regtest"),
        ..ParamsPatch::default()
    }
}

impl ChainParameters {
    /// Main net, built from literal constants.
    pub fn main() -> Result<Self, ParamsError> {
        let network = Network::Main;
        let pow_limit = pow::pow_limit(MAIN_POW_LIMIT_SHIFT);
        let bits = pow::target_to_compact(&pow_limit);

        let genesis = genesis_template().build(MAIN_GENESIS_TIME, MAIN_GENESIS_NONCE, bits);
        let genesis_hash = verify_genesis(network, &genesis, MAIN_GENESIS_HASH, GENESIS_MERKLE_ROOT)?;

        let params = ChainParameters {
            network,
            message_start: MAIN_MAGIC,
            alert_pubkey: decode_key(network, "alert key", MAIN_ALERT_PUBKEY)?,
            checkpoint_pubkey: decode_key(network, "checkpoint key", CHECKPOINT_PUBKEY)?,
            default_port: MAIN_DEFAULT_PORT,
            rpc_port: MAIN_RPC_PORT,
            pow_limit,
            pos_limit: pow::pow_limit(POS_LIMIT_SHIFT),
            genesis,
            genesis_hash,
            base58_prefixes: MAIN_BASE58_PREFIXES,
            fixed_seeds: materialize_seeds(MAIN_SEEDS),
            dns_seeds: MAIN_DNS_SEEDS.to_vec(),
            last_pow_block: MAIN_LAST_POW_BLOCK,
            require_rpc_password: true,
            data_dir: "",
        };
        tracing::debug!("built {} parameters, genesis {}", network, hash_to_hex(&params.genesis_hash));
        Ok(params)
    }

    /// Test net: main net with `testnet_patch` applied.
    pub fn testnet(main: &ChainParameters) -> Result<Self, ParamsError> {
        main.derive(Network::Testnet, testnet_patch())
    }

    /// Regtest: test net with `regtest_patch` applied.
    pub fn regtest(testnet: &ChainParameters) -> Result<Self, ParamsError> {
        testnet.derive(Network::Regtest, regtest_patch())
    }

    /// Copy these parameters for `network` and apply `patch`.
    ///
    /// The genesis block is re-tuned only through `patch.genesis`; its bits
    /// always follow the (possibly new) proof-of-work limit and the result
    /// must hash to the override's recorded value.
    pub fn derive(&self, network: Network, patch: ParamsPatch) -> Result<Self, ParamsError> {
        let mut params = self.clone();
        params.network = network;

        if let Some(magic) = patch.message_start {
            params.message_start = magic;
        }
        if let Some(key) = patch.alert_pubkey {
            params.alert_pubkey = decode_key(network, "alert key", key)?;
        }
        if let Some(port) = patch.default_port {
            params.default_port = port;
        }
        if let Some(port) = patch.rpc_port {
            params.rpc_port = port;
        }
        if let Some(shift) = patch.pow_limit_shift {
            params.pow_limit = pow::pow_limit(shift);
        }
        if let Some(prefixes) = patch.base58_prefixes {
            params.base58_prefixes = prefixes;
        }
        if let Some(seeds) = patch.fixed_seeds {
            params.fixed_seeds = materialize_seeds(seeds);
        }
        if let Some(seeds) = patch.dns_seeds {
            params.dns_seeds = seeds.to_vec();
        }
        if let Some(height) = patch.last_pow_block {
            params.last_pow_block = height;
        }
        if let Some(required) = patch.require_rpc_password {
            params.require_rpc_password = required;
        }
        if let Some(dir) = patch.data_dir {
            params.data_dir = dir;
        }

        let bits = pow::target_to_compact(&params.pow_limit);
        match patch.genesis {
            Some(over) => {
                let time = over.time.unwrap_or(params.genesis.header.time);
                params.genesis = retune(&params.genesis, time, over.nonce, bits);
                params.genesis_hash =
                    verify_genesis(network, &params.genesis, over.expected_hash, GENESIS_MERKLE_ROOT)?;
            }
            None if params.genesis.header.bits != bits => {
                return Err(ParamsError::ConfigurationIntegrity {
                    network,
                    what: "genesis bits",
                    expected: format!("{:08x}", bits),
                    actual: format!("{:08x}", params.genesis.header.bits),
                });
            }
            None => {}
        }

        tracing::debug!("built {} parameters, genesis {}", network, hash_to_hex(&params.genesis_hash));
        Ok(params)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn message_start(&self) -> [u8; 4] {
        self.message_start
    }

    pub fn alert_pubkey(&self) -> &[u8] {
        &self.alert_pubkey
    }

    pub fn checkpoint_pubkey(&self) -> &[u8] {
        &self.checkpoint_pubkey
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    pub fn rpc_port(&self) -> u16 {
        self.rpc_port
    }

    pub fn pow_limit(&self) -> &BigUint {
        &self.pow_limit
    }

    pub fn pos_limit(&self) -> &BigUint {
        &self.pos_limit
    }

    pub fn genesis_block(&self) -> &Block {
        &self.genesis
    }

    pub fn genesis_hash(&self) -> Hash256 {
        self.genesis_hash
    }

    /// Re-check the genesis block against the network's recorded hash and merkle root.
    pub fn check_genesis(&self) -> Result<Hash256, ParamsError> {
        verify_genesis(
            self.network,
            &self.genesis,
            recorded_genesis_hash(self.network),
            GENESIS_MERKLE_ROOT,
        )
    }

    pub fn base58_prefix(&self, kind: Base58Type) -> &'static [u8] {
        self.base58_prefixes[kind.index()]
    }

    pub fn fixed_seeds(&self) -> &[NetAddress] {
        &self.fixed_seeds
    }

    pub fn dns_seeds(&self) -> &[DnsSeed] {
        &self.dns_seeds
    }

    pub fn last_pow_block(&self) -> u32 {
        self.last_pow_block
    }

    /// Whether a proof-of-work block is still accepted at `height`.
    pub fn allows_pow_at(&self, height: u32) -> bool {
        height <= self.last_pow_block
    }

    pub fn require_rpc_password(&self) -> bool {
        self.require_rpc_password
    }

    /// Data sub-directory for this network; empty for main net.
    pub fn data_dir(&self) -> &'static str {
        self.data_dir
    }

    pub fn summary(&self) -> ParamsSummary {
        let header = &self.genesis.header;
        ParamsSummary {
            network: self.network,
            message_start: hex::encode(self.message_start),
            default_port: self.default_port,
            rpc_port: self.rpc_port,
            pow_limit: pow::target_to_hex(&self.pow_limit),
            pos_limit: pow::target_to_hex(&self.pos_limit),
            genesis_hash: hash_to_hex(&self.genesis_hash),
            genesis_merkle_root: hash_to_hex(&header.merkle_root),
            genesis_time: header.time,
            genesis_bits: format!("{:08x}", header.bits),
            genesis_nonce: header.nonce,
            base58_prefixes: Base58Type::ALL
                .into_iter()
                .map(|kind| (kind.name(), hex::encode(self.base58_prefix(kind))))
                .collect(),
            fixed_seeds: self.fixed_seeds.iter().map(|a| a.to_string()).collect(),
            dns_seeds: self.dns_seeds.iter().map(|s| s.host).collect(),
            last_pow_block: self.last_pow_block,
            require_rpc_password: self.require_rpc_password,
            data_dir: self.data_dir,
        }
    }
}

/// Printable view of a `ChainParameters`.
#[derive(Debug, Clone, Serialize)]
pub struct ParamsSummary {
    pub network: Network,
    pub message_start: String,
    pub default_port: u16,
    pub rpc_port: u16,
    pub pow_limit: String,
    pub pos_limit: String,
    pub genesis_hash: String,
    pub genesis_merkle_root: String,
    pub genesis_time: u32,
    pub genesis_bits: String,
    pub genesis_nonce: u32,
    pub base58_prefixes: BTreeMap<&'static str, String>,
    pub fixed_seeds: Vec<String>,
    pub dns_seeds: Vec<&'static str>,
    pub last_pow_block: u32,
    pub require_rpc_password: bool,
    pub data_dir: &'static str,
}

// ─── Registry ────────────────────────────────────────────────────────

/// Resolve the `-testnet` / `-regtest` flags. Both at once is an error.
pub fn network_from_flags(testnet: bool, regtest: bool) -> Result<Network, ParamsError> {
    match (testnet, regtest) {
        (true, true) => Err(ParamsError::InvalidVariantSelection(
            "testnet and regtest cannot both be selected".to_string(),
        )),
        (false, true) => Ok(Network::Regtest),
        (true, false) => Ok(Network::Testnet),
        (false, false) => Ok(Network::Main),
    }
}

/// All three networks' parameters plus the selected one.
///
/// The records never change after `build`; only the selector does.
#[derive(Debug)]
pub struct ChainRegistry {
    main: ChainParameters,
    testnet: ChainParameters,
    regtest: ChainParameters,
    active: AtomicU8,
}

impl ChainRegistry {
    /// Build every network eagerly. Any error here is a fatal integrity failure.
    pub fn build() -> Result<Self, ParamsError> {
        let main = ChainParameters::main()?;
        let testnet = ChainParameters::testnet(&main)?;
        let regtest = ChainParameters::regtest(&testnet)?;
        Ok(ChainRegistry {
            main,
            testnet,
            regtest,
            active: AtomicU8::new(Network::Main.id()),
        })
    }

    pub fn params(&self, network: Network) -> &ChainParameters {
        match network {
            Network::Main => &self.main,
            Network::Testnet => &self.testnet,
            Network::Regtest => &self.regtest,
        }
    }

    pub fn active_network(&self) -> Network {
        // only valid ids are ever stored
        Network::try_from(self.active.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn active(&self) -> &ChainParameters {
        self.params(self.active_network())
    }

    pub fn select(&self, network: Network) {
        self.active.store(network.id(), Ordering::Release);
        tracing::info!("Selected {} network parameters", network);
    }

    /// Select by numeric id; unknown ids leave the selection unchanged.
    pub fn select_id(&self, id: u8) -> Result<Network, ParamsError> {
        let network = Network::try_from(id)?;
        self.select(network);
        Ok(network)
    }

    /// Select from command-line flags; on conflict the selection is unchanged.
    pub fn select_from_flags(&self, testnet: bool, regtest: bool) -> Result<Network, ParamsError> {
        let network = network_from_flags(testnet, regtest)?;
        self.select(network);
        Ok(network)
    }
}

// ─── Process-wide Handle ─────────────────────────────────────────────

static REGISTRY: OnceLock<ChainRegistry> = OnceLock::new();

/// The process-wide registry, built on first use.
///
/// Panics if the compiled-in parameters are inconsistent: the binary cannot
/// run on any network in that case.
pub fn registry() -> &'static ChainRegistry {
    REGISTRY.get_or_init(|| match ChainRegistry::build() {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("❌ Chain parameters are inconsistent: {}", e);
            panic!("chain parameters are inconsistent: {}", e);
        }
    })
}

/// Select the network from command-line flags. Call once at startup, before
/// anything reads `params()`.
pub fn init_network(testnet: bool, regtest: bool) -> Result<Network, ParamsError> {
    registry().select_from_flags(testnet, regtest)
}

pub fn select_params(network: Network) {
    registry().select(network);
}

/// Parameters of the selected network.
pub fn params() -> &'static ChainParameters {
    registry().active()
}

pub fn magic_bytes() -> [u8; 4] {
    params().message_start()
}

pub fn default_port() -> u16 {
    params().default_port()
}

pub fn rpc_port() -> u16 {
    params().rpc_port()
}

pub fn data_dir() -> &'static str {
    params().data_dir()
}

pub fn is_testnet() -> bool {
    params().network() == Network::Testnet
}

pub fn is_regtest() -> bool {
    params().network() == Network::Regtest
}
