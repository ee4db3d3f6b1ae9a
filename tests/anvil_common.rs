#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;

use curve_metapool_harness::config::{ContractConfig, ForkConfig, TxOverrides};
use curve_metapool_harness::contracts::IERC20;
use curve_metapool_harness::fork::ForkNode;
use curve_metapool_harness::model::{LiquidityPool, Whales, pool, whale};

// ── Mainnet constants ────────────────────────────────────────────────

pub const MIM: &str = "0x99D8a9C45b2ecA8864373A26D1459e3Dff1e17F3";
pub const MIM_POOL: &str = "0x5a6A4D54456819380173272A5E8E9B9904BdF41B";
pub const REGISTRY: &str = "0x99fa011e33a8c6196869dec7bc407e896ba67fe3";
pub const METAPOOL_FACTORY: &str = "0x0959158b6040D32d04c301A72CBFD6b39E21c9AE";

/// Private key of anvil's first dev account (`signers.admin`).
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

// ── Fork context ─────────────────────────────────────────────────────

/// Fork URL from the environment, or None to skip the test.
pub fn fork_config() -> Option<ForkConfig> {
    let fork_url = std::env::var("CURVE_HARNESS_FORK_URL")
        .or_else(|_| std::env::var("ETH_RPC_URL"))
        .ok()?;
    Some(ForkConfig {
        fork_url,
        fork_block: std::env::var("CURVE_HARNESS_FORK_BLOCK")
            .ok()
            .and_then(|b| b.parse().ok()),
        anvil_bin: std::env::var("ANVIL_BIN").ok().map(PathBuf::from),
    })
}

/// Spawn a mainnet fork, or None when no fork URL is configured.
pub fn spawn_fork() -> Option<ForkNode> {
    let config = match fork_config() {
        Some(c) => c,
        None => {
            eprintln!("Skipping: CURVE_HARNESS_FORK_URL / ETH_RPC_URL not set");
            return None;
        }
    };
    Some(ForkNode::spawn(&config).expect("anvil fork failed to start"))
}

pub fn contract_config() -> ContractConfig {
    ContractConfig {
        artifacts_dir: std::env::var("CURVE_HARNESS_ARTIFACTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("artifacts")),
        registry: REGISTRY.parse().unwrap(),
        metapool_factory: METAPOOL_FACTORY.parse().unwrap(),
        overrides: TxOverrides::default(),
    }
}

pub const POOL_TIMEOUT: Duration = Duration::from_secs(100);

// ── Data files ───────────────────────────────────────────────────────

pub fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

pub fn shipped_pools() -> LiquidityPool {
    pool::load_pools(&data_path("curve_metapool_pools.json")).expect("pool registry")
}

pub fn shipped_whales() -> Whales {
    whale::load_whales(&data_path("whales.json")).expect("whales")
}

// ── Queries ──────────────────────────────────────────────────────────

pub async fn balance_of<P: Provider>(provider: &P, token: Address, account: Address) -> U256 {
    IERC20::new(token, provider)
        .balanceOf(account)
        .call()
        .await
        .expect("balanceOf call failed")
}
