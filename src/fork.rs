use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::primitives::{Address, B256, U256, address};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::config::ForkConfig;

/// Account that operates vaults on mainnet; only ever impersonated on the fork.
pub const OPERATOR: Address = address!("6bd60f089B6E8BA75c409a54CDea34AA511277f6");

/// Named accounts used by the suite.
#[derive(Debug, Clone, Copy)]
pub struct Signers {
    pub admin: Address,
    pub owner: Address,
    pub deployer: Address,
    pub alice: Address,
    pub bob: Address,
    pub charlie: Address,
    pub dave: Address,
    pub eve: Address,
    pub operator: Address,
}

impl Signers {
    /// Map the node's unlocked dev accounts onto roles, in order.
    pub fn from_dev_accounts(accounts: &[Address]) -> Result<Self> {
        if accounts.len() < 8 {
            bail!("need at least 8 dev accounts, node exposes {}", accounts.len());
        }
        Ok(Signers {
            admin: accounts[0],
            owner: accounts[1],
            deployer: accounts[2],
            alice: accounts[3],
            bob: accounts[4],
            charlie: accounts[5],
            dave: accounts[6],
            eve: accounts[7],
            operator: OPERATOR,
        })
    }
}

// ── Fork node ────────────────────────────────────────────────────────

/// A local anvil fork of mainnet. Killed on drop.
pub struct ForkNode {
    _anvil: AnvilInstance,
    pub endpoint: String,
    pub provider: DynProvider,
    pub signers: Signers,
}

impl ForkNode {
    pub fn spawn(config: &ForkConfig) -> Result<Self> {
        let mut anvil = match &config.anvil_bin {
            Some(bin) => Anvil::at(bin),
            None => Anvil::new(),
        }
        .fork(config.fork_url.clone())
        .timeout(60_000);
        if let Some(block) = config.fork_block {
            anvil = anvil.fork_block_number(block);
        }
        let anvil = anvil.try_spawn().context("spawning anvil fork")?;

        let endpoint = anvil.endpoint();
        let provider = ProviderBuilder::new()
            .connect_http(endpoint.parse().context("anvil endpoint")?)
            .erased();
        let signers = Signers::from_dev_accounts(anvil.addresses())?;

        debug!(%endpoint, block = ?config.fork_block, "fork node up");

        Ok(ForkNode {
            _anvil: anvil,
            endpoint,
            provider,
            signers,
        })
    }
}

// ── Cheat codes ──────────────────────────────────────────────────────

pub async fn set_balance<P: Provider>(provider: &P, addr: Address, amount: U256) -> Result<()> {
    let _: () = provider
        .raw_request("anvil_setBalance".into(), (addr, amount))
        .await
        .context("anvil_setBalance")?;
    Ok(())
}

pub async fn impersonate<P: Provider>(provider: &P, addr: Address) -> Result<()> {
    let _: () = provider
        .raw_request("anvil_impersonateAccount".into(), [addr])
        .await
        .context("anvil_impersonateAccount")?;
    Ok(())
}

pub async fn stop_impersonating<P: Provider>(provider: &P, addr: Address) -> Result<()> {
    let _: () = provider
        .raw_request("anvil_stopImpersonatingAccount".into(), [addr])
        .await
        .context("anvil_stopImpersonatingAccount")?;
    Ok(())
}

pub async fn set_storage_at<P: Provider>(
    provider: &P,
    contract: Address,
    slot: B256,
    value: B256,
) -> Result<()> {
    let _: serde_json::Value = provider
        .raw_request("anvil_setStorageAt".into(), (contract, slot, value))
        .await
        .context("anvil_setStorageAt")?;
    Ok(())
}

pub async fn storage_at<P: Provider>(provider: &P, contract: Address, slot: B256) -> Result<B256> {
    let value = provider
        .get_storage_at(contract, U256::from_be_bytes(slot.0))
        .await
        .context("eth_getStorageAt")?;
    Ok(B256::from(value.to_be_bytes::<32>()))
}
