use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolValue;
use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::config::DeployConfig;
use crate::contracts::{self, ADAPTER_ARTIFACT, Artifact};

/// Entry point for the `deploy` command.
pub fn run(config: &DeployConfig) -> Result<()> {
    let artifact = Artifact::load(&config.contracts.artifacts_dir, ADAPTER_ARTIFACT)?;
    info!(path = %artifact.path.display(), rpc = %config.rpc_url, deployer = %config.deployer, "deploying");

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let address = rt.block_on(deploy_adapter(config, &artifact))?;

    println!("CurveMetapoolSwapAdapter deployed to:  {address}");
    Ok(())
}

/// Deploy `CurveMetapoolSwapAdapter(registry)` from the configured wallet.
pub async fn deploy_adapter(config: &DeployConfig, artifact: &Artifact) -> Result<Address> {
    let signer: PrivateKeySigner = config
        .private_key
        .parse()
        .map_err(|e| anyhow!("Invalid private key: {e}"))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(config.rpc_url.parse().context("rpc url")?);

    contracts::deploy(
        &provider,
        config.deployer,
        artifact,
        &config.contracts.registry.abi_encode(),
        &config.contracts.overrides,
    )
    .await
}
