use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Curve metapool adapter harness — deploy the CurveMetapoolSwapAdapter and
/// exercise its deposit/withdraw codes against a mainnet fork.
#[derive(Parser)]
#[command(name = "curve-metapool-harness", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy CurveMetapoolSwapAdapter and print its address
    Deploy {
        /// JSON-RPC endpoint to deploy to (falls back to $CURVE_HARNESS_RPC_URL)
        #[arg(long)]
        rpc_url: Option<String>,

        #[command(flatten)]
        contracts: ContractArgs,
    },

    /// Fork mainnet and run the deposit/withdraw cycle against every registered metapool
    Check {
        /// Archive node URL to fork from (falls back to $CURVE_HARNESS_FORK_URL)
        #[arg(long)]
        fork_url: Option<String>,

        /// Pin the fork to a block number
        #[arg(long)]
        fork_block: Option<u64>,

        /// Path to the anvil binary (default: anvil on $PATH)
        #[arg(long)]
        anvil_bin: Option<PathBuf>,

        /// Only run pools whose name contains this string
        #[arg(long)]
        pool: Option<String>,

        /// Pool registry JSON
        #[arg(long, default_value = "data/curve_metapool_pools.json")]
        pools_file: PathBuf,

        /// Token → holder JSON used when storage funding fails
        #[arg(long, default_value = "data/whales.json")]
        whales_file: PathBuf,

        /// Per-pool timeout in seconds
        #[arg(long, default_value = "100")]
        timeout_secs: u64,

        /// Write the suite report as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        contracts: ContractArgs,
    },

    /// List the metapools in the pool registry
    List {
        /// Pool registry JSON
        #[arg(long, default_value = "data/curve_metapool_pools.json")]
        pools_file: PathBuf,
    },
}

/// Flags shared by every command that deploys or calls the adapter.
#[derive(Args, Clone)]
pub struct ContractArgs {
    /// Directory holding compiled contract artifacts (Hardhat or Foundry layout)
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Registry address passed to the adapter constructor
    #[arg(long, default_value = "0x99fa011e33a8c6196869dec7bc407e896ba67fe3")]
    pub registry: String,

    /// Curve metapool factory used to resolve pool coins
    #[arg(long, default_value = "0x0959158b6040D32d04c301A72CBFD6b39E21c9AE")]
    pub metapool_factory: String,

    /// Gas limit applied to every transaction
    #[arg(long, default_value = "6721975")]
    pub gas_limit: u64,

    /// Gas price in wei (default: node estimate)
    #[arg(long)]
    pub gas_price: Option<u128>,
}
