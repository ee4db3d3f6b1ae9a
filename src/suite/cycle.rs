use std::fmt;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Suite;
use crate::contracts::{
    self, CurveMetapoolSwapAdapter, ICurveMetapoolFactory, ICurveMetapoolSwap, IERC20, TestDeFiAdapter,
};
use crate::error::HarnessError;
use crate::expect;
use crate::funding::{self, FundingRoute};
use crate::model::PoolItem;

/// Why a pool was not exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The strategy can only deposit a single underlying token.
    MultipleUnderlying,
    ZeroTotalSupply,
    ZeroVirtualPrice,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MultipleUnderlying => {
                write!(f, "the strategy requires to deposit more than one underlying token")
            }
            SkipReason::ZeroTotalSupply => write!(f, "total supply is zero"),
            SkipReason::ZeroVirtualPrice => write!(f, "virtual price is zero"),
        }
    }
}

/// Observed values of a passing deposit/withdraw cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub funded_by: FundingRoute,
    pub token_index: usize,
    pub pool_value: U256,
    pub deposit_amounts: [U256; 2],
    pub expected_lp: U256,
    pub lp_after_deposit: U256,
    pub underlying_after_deposit: U256,
    pub amount_in_token: U256,
    pub lp_after_withdraw: U256,
    pub underlying_after_withdraw: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed(CycleReport),
    Skipped { reason: SkipReason },
    Failed { error: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed(r) => write!(
                f,
                "PASSED (lp {} → {}, funded by {})",
                r.lp_after_deposit, r.lp_after_withdraw, r.funded_by
            ),
            Outcome::Skipped { reason } => write!(f, "SKIPPED: {reason}"),
            Outcome::Failed { error } => write!(f, "FAILED: {error}"),
        }
    }
}

impl Suite {
    /// Fund the harness, deposit everything through the adapter's codes, check
    /// the adapter's view of the position, withdraw everything, check again.
    pub(crate) async fn cycle(&self, name: &str, pool: &PoolItem) -> Result<Outcome> {
        let token = pool.underlying().ok_or_else(|| HarnessError::EmptyPool {
            pool: name.to_string(),
        })?;

        let funded_by = funding::fund_with_fallback(&self.storage, &self.whale, token, self.harness)
            .await
            .with_context(|| format!("funding harness with {token}"))?;

        if !pool.is_single_asset() {
            return Ok(skip(name, SkipReason::MultipleUnderlying));
        }

        let swap = ICurveMetapoolSwap::new(pool.pool, &self.provider);
        let total_supply = swap.totalSupply().call().await.context("totalSupply")?;
        if total_supply.is_zero() {
            return Ok(skip(name, SkipReason::ZeroTotalSupply));
        }
        let virtual_price = swap.get_virtual_price().call().await.context("get_virtual_price")?;
        if virtual_price.is_zero() {
            return Ok(skip(name, SkipReason::ZeroVirtualPrice));
        }

        let factory = ICurveMetapoolFactory::new(self.metapool_factory, &self.provider);
        let coins = factory.get_coins(pool.pool).call().await.context("get_coins")?;
        let token_index = expect::token_index(&coins, token).unwrap_or(0);

        let erc20 = IERC20::new(token, &self.provider);
        let balance = erc20.balanceOf(self.harness).call().await.context("balanceOf harness")?;
        let pool_value = expect::pool_value(virtual_price, total_supply);
        let deposit_amounts = expect::deposit_amounts(&coins, token, balance, pool_value);
        let expected_lp = swap
            .calc_token_amount(deposit_amounts, true)
            .call()
            .await
            .context("calc_token_amount")?;
        debug!(name, token_index, %pool_value, %balance, %expected_lp, "deposit expectation");

        let adapter = CurveMetapoolSwapAdapter::new(self.adapter, &self.provider);
        let harness = TestDeFiAdapter::new(self.harness, &self.provider);

        // 1. Deposit all
        let deposit = harness
            .testGetDepositAllCodes(token, pool.pool, self.adapter)
            .from(self.harness_caller());
        contracts::send(contracts::with_overrides(deposit, &self.overrides), "testGetDepositAllCodes").await?;

        let lp_after_deposit = self.lp_balance(&adapter, pool.pool).await?;
        expect::check_above_floor("LP balance after deposit vs calc_token_amount", lp_after_deposit, expected_lp)?;
        let pool_lp = swap.balanceOf(self.harness).call().await.context("pool balanceOf")?;
        expect::check_equal("LP balance after deposit", lp_after_deposit, pool_lp)?;

        let underlying = underlying_token(&adapter, pool.pool, token_index).await?;
        let underlying_after_deposit = harness
            .getERC20TokenBalance(underlying, self.harness)
            .call()
            .await
            .context("getERC20TokenBalance")?;
        let token_balance = erc20.balanceOf(self.harness).call().await.context("balanceOf harness")?;
        expect::check_equal("underlying balance after deposit", underlying_after_deposit, token_balance)?;

        let amount_in_token = adapter
            .getAllAmountInToken(self.harness, token, pool.pool)
            .call()
            .await
            .context("getAllAmountInToken")?;
        let withdrawable = swap
            .calc_withdraw_one_coin(lp_after_deposit, token_index as i128)
            .call()
            .await
            .context("calc_withdraw_one_coin")?;
        expect::check_equal("amount in token after deposit", amount_in_token, withdrawable)?;

        // 2. Withdraw all
        let withdraw = harness
            .testGetWithdrawAllCodes(token, pool.pool, self.adapter)
            .from(self.harness_caller());
        contracts::send(contracts::with_overrides(withdraw, &self.overrides), "testGetWithdrawAllCodes").await?;

        let lp_after_withdraw = self.lp_balance(&adapter, pool.pool).await?;
        let pool_lp = swap.balanceOf(self.harness).call().await.context("pool balanceOf")?;
        expect::check_equal("LP balance after withdraw", lp_after_withdraw, pool_lp)?;

        let underlying = underlying_token(&adapter, pool.pool, token_index).await?;
        let underlying_after_withdraw = harness
            .getERC20TokenBalance(underlying, self.harness)
            .call()
            .await
            .context("getERC20TokenBalance")?;
        let token_balance = erc20.balanceOf(self.harness).call().await.context("balanceOf harness")?;
        expect::check_equal("underlying balance after withdraw", underlying_after_withdraw, token_balance)?;

        Ok(Outcome::Passed(CycleReport {
            funded_by,
            token_index,
            pool_value,
            deposit_amounts,
            expected_lp,
            lp_after_deposit,
            underlying_after_deposit,
            amount_in_token,
            lp_after_withdraw,
            underlying_after_withdraw,
        }))
    }

    /// The harness address doubles as the placeholder underlying-token argument.
    async fn lp_balance<P: alloy::providers::Provider>(
        &self,
        adapter: &CurveMetapoolSwapAdapter::CurveMetapoolSwapAdapterInstance<P>,
        pool: Address,
    ) -> Result<U256> {
        adapter
            .getLiquidityPoolTokenBalance(self.harness, self.harness, pool)
            .call()
            .await
            .context("getLiquidityPoolTokenBalance")
    }
}

async fn underlying_token<P: alloy::providers::Provider>(
    adapter: &CurveMetapoolSwapAdapter::CurveMetapoolSwapAdapterInstance<P>,
    pool: Address,
    index: usize,
) -> Result<Address> {
    let tokens = adapter
        .getUnderlyingTokens(pool, pool)
        .call()
        .await
        .context("getUnderlyingTokens")?;
    tokens
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!("adapter lists {} underlying tokens, wanted index {index}", tokens.len()))
}

fn skip(name: &str, reason: SkipReason) -> Outcome {
    info!(name, "Skipping because {reason}");
    Outcome::Skipped { reason }
}
