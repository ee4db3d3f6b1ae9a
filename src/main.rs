use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use curve_metapool_harness::cli::{self, Command};
use curve_metapool_harness::config::{CheckConfig, ContractConfig, DeployConfig, ForkConfig};
use curve_metapool_harness::{deploy, list_pools, suite};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        Command::Deploy { rpc_url, contracts } => {
            deploy::run(&DeployConfig::from_cli(rpc_url.as_deref(), &contracts)?)
        }
        Command::Check {
            fork_url,
            fork_block,
            anvil_bin,
            pool,
            pools_file,
            whales_file,
            timeout_secs,
            output,
            contracts,
        } => suite::run(&CheckConfig {
            fork: ForkConfig::from_cli(fork_url.as_deref(), fork_block, anvil_bin)?,
            contracts: ContractConfig::from_cli(&contracts)?,
            pools_file,
            whales_file,
            pool_filter: pool,
            timeout: Duration::from_secs(timeout_secs),
            output,
        }),
        Command::List { pools_file } => list_pools::run(&pools_file),
    }
}
