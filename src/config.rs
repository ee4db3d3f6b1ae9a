use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result, anyhow};

use crate::cli::ContractArgs;

pub const PRIVATE_KEY_ENV: &str = "CURVE_HARNESS_PRIVATE_KEY";
pub const RPC_URL_ENV: &str = "CURVE_HARNESS_RPC_URL";
pub const FORK_URL_ENV: &str = "CURVE_HARNESS_FORK_URL";

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Gas settings attached to every state-changing call.
#[derive(Debug, Clone, Copy)]
pub struct TxOverrides {
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
}

impl Default for TxOverrides {
    fn default() -> Self {
        TxOverrides {
            gas_limit: 6_721_975,
            gas_price: None,
        }
    }
}

/// Where the adapter comes from and which on-chain collaborators it talks to.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub artifacts_dir: PathBuf,
    pub registry: Address,
    pub metapool_factory: Address,
    pub overrides: TxOverrides,
}

impl ContractConfig {
    pub fn from_cli(args: &ContractArgs) -> Result<Self> {
        Ok(ContractConfig {
            artifacts_dir: args.artifacts_dir.clone(),
            registry: parse_address("registry", &args.registry)?,
            metapool_factory: parse_address("metapool factory", &args.metapool_factory)?,
            overrides: TxOverrides {
                gas_limit: args.gas_limit,
                gas_price: args.gas_price,
            },
        })
    }
}

/// Configuration for the `deploy` command.
pub struct DeployConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub deployer: Address,
    pub contracts: ContractConfig,
}

impl DeployConfig {
    pub fn from_cli(rpc_url: Option<&str>, args: &ContractArgs) -> Result<Self> {
        let rpc_url = rpc_url
            .map(str::to_string)
            .or_else(|| std::env::var(RPC_URL_ENV).ok());
        Self::resolve(std::env::var(PRIVATE_KEY_ENV).ok(), rpc_url, args)
    }

    /// Build from already-looked-up values. `rpc_url` falls back to the local node.
    pub fn resolve(private_key: Option<String>, rpc_url: Option<String>, args: &ContractArgs) -> Result<Self> {
        let private_key = private_key.ok_or_else(|| {
            anyhow!(
                "{PRIVATE_KEY_ENV} env var not set. \
                 Set it to the deployer's hex private key."
            )
        })?;
        let private_key = private_key.trim().trim_start_matches("0x").to_string();

        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| anyhow!("Invalid private key: {e}"))?;

        Ok(DeployConfig {
            rpc_url: rpc_url.unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            private_key,
            deployer: signer.address(),
            contracts: ContractConfig::from_cli(args)?,
        })
    }
}

/// How to start the local mainnet fork.
#[derive(Debug, Clone)]
pub struct ForkConfig {
    pub fork_url: String,
    pub fork_block: Option<u64>,
    pub anvil_bin: Option<PathBuf>,
}

impl ForkConfig {
    pub fn from_cli(fork_url: Option<&str>, fork_block: Option<u64>, anvil_bin: Option<PathBuf>) -> Result<Self> {
        let fork_url = match fork_url {
            Some(url) => url.to_string(),
            None => std::env::var(FORK_URL_ENV)
                .with_context(|| format!("--fork-url not given and {FORK_URL_ENV} not set"))?,
        };
        Ok(ForkConfig {
            fork_url,
            fork_block,
            anvil_bin,
        })
    }
}

/// Configuration for the `check` command.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub fork: ForkConfig,
    pub contracts: ContractConfig,
    pub pools_file: PathBuf,
    pub whales_file: PathBuf,
    pub pool_filter: Option<String>,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
}

pub fn parse_address(label: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {label} address '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_and_checksummed_addresses() {
        let lower = parse_address("registry", "0x99fa011e33a8c6196869dec7bc407e896ba67fe3").unwrap();
        let mixed = parse_address("registry", "0x99fA011e33a8c6196869DeC7Bc407E896BA67fE3").unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn rejects_garbage_address() {
        let err = parse_address("metapool factory", "0xnothex").unwrap_err();
        assert!(err.to_string().contains("metapool factory"));
    }

    // anvil dev account 0
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn contract_args() -> ContractArgs {
        ContractArgs {
            artifacts_dir: PathBuf::from("artifacts"),
            registry: "0x99fa011e33a8c6196869dec7bc407e896ba67fe3".to_string(),
            metapool_factory: "0x0959158b6040D32d04c301A72CBFD6b39E21c9AE".to_string(),
            gas_limit: 6_721_975,
            gas_price: None,
        }
    }

    #[test]
    fn deploy_key_with_and_without_prefix() {
        let bare = DeployConfig::resolve(Some(DEV_KEY.to_string()), None, &contract_args()).unwrap();
        let prefixed = DeployConfig::resolve(Some(format!(" 0x{DEV_KEY}\n")), None, &contract_args()).unwrap();

        let expected: Address = DEV_ADDRESS.parse().unwrap();
        assert_eq!(bare.deployer, expected);
        assert_eq!(prefixed.deployer, expected);
        assert_eq!(prefixed.private_key, DEV_KEY);
    }

    #[test]
    fn invalid_deploy_key_is_rejected() {
        let Err(err) = DeployConfig::resolve(Some("0xdeadbeef".to_string()), None, &contract_args()) else {
            panic!("short key accepted");
        };
        assert!(err.to_string().contains("Invalid private key"), "{err}");
    }

    #[test]
    fn missing_deploy_key_names_the_env_var() {
        let Err(err) = DeployConfig::resolve(None, None, &contract_args()) else {
            panic!("deployed without a key");
        };
        assert!(err.to_string().contains(PRIVATE_KEY_ENV), "{err}");
    }

    #[test]
    fn deploy_rpc_url_defaults_to_local_node() {
        let local = DeployConfig::resolve(Some(DEV_KEY.to_string()), None, &contract_args()).unwrap();
        assert_eq!(local.rpc_url, "http://127.0.0.1:8545");

        let remote = DeployConfig::resolve(
            Some(DEV_KEY.to_string()),
            Some("https://rpc.example.org".to_string()),
            &contract_args(),
        )
        .unwrap();
        assert_eq!(remote.rpc_url, "https://rpc.example.org");
        assert_eq!(remote.contracts.registry, parse_address("registry", "0x99fa011e33a8c6196869dec7bc407e896ba67fe3").unwrap());
    }

    #[test]
    fn contract_config_from_cli_defaults() {
        let config = ContractConfig::from_cli(&contract_args()).unwrap();
        assert_eq!(config.overrides.gas_limit, TxOverrides::default().gas_limit);
        assert!(config.overrides.gas_price.is_none());
    }
}
