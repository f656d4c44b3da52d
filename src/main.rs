use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use blackstar::core::genesis::retune;
use blackstar::core::error::ParamsError;
use blackstar::core::params::{self, Base58Type, ChainParameters, Network};
use blackstar::crypto::hash_to_hex;
use blackstar::miner::{self, SearchResult};
use blackstar::pow;

#[derive(Parser)]
#[command(name = "blackstar", version)]
#[command(about = "Blackstar - chain parameters and genesis tooling")]
struct Cli {
    /// Use the public test network
    #[arg(long, global = true)]
    testnet: bool,
    /// Use the local regression-test network
    #[arg(long, global = true)]
    regtest: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the selected network's parameters
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the selected network's genesis block
    Genesis,
    /// Show bootstrap seeds
    Seeds,
    /// Search for a genesis nonce (offline, for defining a new network)
    SearchGenesis {
        /// Genesis time to start from (default: the network's genesis time)
        #[arg(long)]
        time: Option<u32>,
        /// Nonce to start from
        #[arg(long, default_value_t = 0)]
        nonce: u32,
        /// Target as `~0 >> SHIFT` (default: the genesis bits)
        #[arg(long)]
        target_shift: Option<u32>,
    },
}

impl Cli {
    /// Network named by the global flags.
    fn network(&self) -> Result<Network, ParamsError> {
        params::network_from_flags(self.testnet, self.regtest)
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blackstar=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Must happen before anything reads params()
    match cli.network() {
        Ok(network) => params::select_params(network),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
    let p = params::params();

    match cli.command {
        Commands::Info { json } => {
            if json {
                match serde_json::to_string_pretty(&p.summary()) {
                    Ok(s) => println!("{}", s),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_info(p);
            }
        }

        Commands::Genesis => {
            let block = p.genesis_block();
            let header = &block.header;
            println!("🧱 Genesis ({})", p.network());
            println!("  Hash:        {}", hash_to_hex(&p.genesis_hash()));
            println!("  Merkle root: {}", hash_to_hex(&header.merkle_root));
            println!("  Version:     {}", header.version);
            println!("  Time:        {}", header.time);
            println!("  Bits:        {:08x}", header.bits);
            println!("  Nonce:       {}", header.nonce);
            println!("  PoW hash:    {}", hash_to_hex(&header.pow_hash()));
            for tx in &block.transactions {
                println!("  Coinbase:    {}", hash_to_hex(&tx.txid()));
                println!("    time:      {}", tx.time);
                for input in &tx.inputs {
                    println!("    scriptSig: {}", hex::encode(&input.script_sig));
                }
            }
            match p.check_genesis() {
                Ok(_) => println!("  ✅ Matches recorded hash and merkle root"),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Seeds => {
            let now = unix_now();
            println!("🌱 Seeds ({})", p.network());
            if p.fixed_seeds().is_empty() {
                println!("  No fixed seeds.");
            }
            for addr in p.fixed_seeds() {
                let age = now.saturating_sub(addr.time);
                println!("  {:<28} last seen {:.1} days ago", addr.to_string(), age as f64 / 86_400.0);
            }
            if p.dns_seeds().is_empty() {
                println!("  No DNS seeds.");
            }
            for seed in p.dns_seeds() {
                println!("  dns: {} ({})", seed.host, seed.name);
            }
        }

        Commands::SearchGenesis { time, nonce, target_shift } => {
            let genesis = p.genesis_block();
            let target = match target_shift {
                Some(shift) => pow::pow_limit(shift),
                None => match pow::compact_to_target(genesis.header.bits) {
                    Some(t) => t,
                    None => {
                        eprintln!("❌ Genesis bits {:08x} do not encode a target", genesis.header.bits);
                        std::process::exit(1);
                    }
                },
            };
            let start = retune(
                genesis,
                time.unwrap_or(genesis.header.time),
                nonce,
                pow::target_to_compact(&target),
            );

            let stop = Arc::new(AtomicBool::new(false));
            let stop_clone = stop.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                println!("\n🛑 Stopping search...");
                stop_clone.store(true, Ordering::SeqCst);
            }) {
                eprintln!("⚠️  Could not install Ctrl-C handler: {}", e);
            }

            match miner::search_genesis(start, &target, &stop) {
                SearchResult::Found(block) => {
                    println!("⛏️  Found genesis for {}", p.network());
                    println!("  time  = {}", block.header.time);
                    println!("  nonce = {}", block.header.nonce);
                    println!("  hash  = {}", hash_to_hex(&block.header.hash()));
                }
                SearchResult::Cancelled { attempts } => {
                    println!("Search cancelled after {} hashes.", attempts);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn print_info(p: &ChainParameters) {
    println!("📊 Blackstar ({})", p.network());
    println!("  Magic:        {}", hex::encode(p.message_start()));
    println!("  P2P port:     {}", p.default_port());
    println!("  RPC port:     {}", p.rpc_port());
    println!("  RPC password: {}", if p.require_rpc_password() { "required" } else { "optional" });
    println!("  PoW limit:    {}", pow::target_to_hex(p.pow_limit()));
    println!("  PoS limit:    {}", pow::target_to_hex(p.pos_limit()));
    println!("  Last PoW:     {}", p.last_pow_block());
    println!("  Genesis:      {}", hash_to_hex(&p.genesis_hash()));
    println!("  Data dir:     {}", if p.data_dir().is_empty() { "." } else { p.data_dir() });
    println!("  Alert key:    {}", hex::encode(p.alert_pubkey()));
    println!("  Checkpoints:  {}", hex::encode(p.checkpoint_pubkey()));
    for kind in Base58Type::ALL {
        println!("  {:<14} {}", format!("{}:", kind.name()), hex::encode(p.base58_prefix(kind)));
    }
    println!("  Fixed seeds:  {}", p.fixed_seeds().len());
    println!("  DNS seeds:    {}", p.dns_seeds().len());
}
