use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{BalanceSource, FundingRoute};
use crate::config::TxOverrides;
use crate::contracts::{self, IERC20};
use crate::error::HarnessError;
use crate::model::Whales;
use crate::{expect, fork};

/// ETH sent to the whale so it can pay for the transfer.
const WHALE_GAS_ETH: u64 = 100;

/// Borrows a balance from a large holder by impersonating it.
pub struct WhaleFunding {
    provider: DynProvider,
    whales: Whales,
    gas_funder: Address,
    overrides: TxOverrides,
}

impl WhaleFunding {
    /// `gas_funder` is an unlocked account that pays the whale's gas.
    pub fn new(provider: DynProvider, whales: Whales, gas_funder: Address, overrides: TxOverrides) -> Self {
        WhaleFunding {
            provider,
            whales,
            gas_funder,
            overrides,
        }
    }

    pub fn whale_for(&self, token: Address) -> Option<Address> {
        self.whales.get(&token).copied()
    }

    /// Stop impersonating the whale of `token`. A no-op for tokens without a
    /// whale or whales that are not impersonated.
    pub async fn release(&self, token: Address) -> Result<()> {
        if let Some(whale) = self.whale_for(token) {
            fork::stop_impersonating(&self.provider, whale).await?;
            debug!(%token, %whale, "whale released");
        }
        Ok(())
    }

    async fn send_gas(&self, whale: Address) -> Result<()> {
        let mut tx = TransactionRequest::default()
            .with_from(self.gas_funder)
            .with_to(whale)
            .with_value(expect::scale(WHALE_GAS_ETH, 18))
            .with_gas_limit(self.overrides.gas_limit);
        if let Some(price) = self.overrides.gas_price {
            tx = tx.with_gas_price(price);
        }

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .context("sending whale gas")?
            .get_receipt()
            .await
            .context("whale gas receipt")?;
        if !receipt.status() {
            return Err(HarnessError::Reverted {
                tx: format!("whale gas ({})", receipt.transaction_hash),
            }
            .into());
        }
        Ok(())
    }

    async fn transfer(&self, token: Address, whale: Address, recipient: Address, amount: U256) -> Result<()> {
        self.send_gas(whale).await?;
        let erc20 = IERC20::new(token, &self.provider);
        let transfer = contracts::with_overrides(erc20.transfer(recipient, amount).from(whale), &self.overrides);
        contracts::send(transfer, "whale transfer").await?;
        Ok(())
    }
}

#[async_trait]
impl BalanceSource for WhaleFunding {
    fn route(&self) -> FundingRoute {
        FundingRoute::Whale
    }

    async fn fund(&self, token: Address, recipient: Address) -> Result<()> {
        let whale = self.whale_for(token).ok_or(HarnessError::MissingWhale { token })?;

        let erc20 = IERC20::new(token, &self.provider);
        let decimals = erc20.decimals().call().await.context("decimals")?;
        let balance = erc20.balanceOf(recipient).call().await.context("balanceOf recipient")?;
        let whale_balance = erc20.balanceOf(whale).call().await.context("balanceOf whale")?;
        info!(%token, %recipient, %balance, "recipient balance before");
        info!(%token, %whale, balance = %whale_balance, "whale balance before");

        if !needs_top_up(balance) {
            return Ok(());
        }

        fork::impersonate(&self.provider, whale).await?;
        let amount = expect::whale_transfer_amount(decimals);
        let sent = self.transfer(token, whale, recipient, amount).await;
        fork::stop_impersonating(&self.provider, whale).await?;
        sent?;

        let after = erc20.balanceOf(recipient).call().await.context("balanceOf recipient")?;
        info!(%token, %recipient, balance = %after, "recipient balance after");
        Ok(())
    }
}

/// Only an empty recipient is topped up; any balance, even one base unit, is kept.
fn needs_top_up(balance: U256) -> bool {
    balance.is_zero()
}
