pub mod artifact;

use alloy::contract::{CallBuilder, CallDecoder};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use alloy::sol;
use anyhow::{Context, Result};

use crate::config::TxOverrides;
use crate::error::HarnessError;

pub use artifact::{Artifact, deploy};

// ── Adapter under test ──────────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract CurveMetapoolSwapAdapter {
        function getDepositAllCodes(address _vault, address _underlyingToken, address _liquidityPool) external view returns (bytes[] memory);
        function getWithdrawAllCodes(address _vault, address _underlyingToken, address _liquidityPool) external view returns (bytes[] memory);
        function getLiquidityPoolTokenBalance(address _vault, address _underlyingToken, address _liquidityPool) external view returns (uint256);
        function getUnderlyingTokens(address _liquidityPool, address _liquidityPoolToken) external view returns (address[] memory);
        function getAllAmountInToken(address _vault, address _underlyingToken, address _liquidityPool) external view returns (uint256);
    }
}

// ── Harness that executes adapter codes as a vault would ────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract TestDeFiAdapter {
        function testGetDepositAllCodes(address _underlyingToken, address _liquidityPool, address _adapter) external;
        function testGetWithdrawAllCodes(address _underlyingToken, address _liquidityPool, address _adapter) external;
        function getERC20TokenBalance(address _token, address _account) external view returns (uint256);
    }
}

// ── Curve ───────────────────────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ICurveMetapoolSwap {
        function totalSupply() external view returns (uint256);
        function get_virtual_price() external view returns (uint256);
        function calc_token_amount(uint256[2] _amounts, bool _is_deposit) external view returns (uint256);
        function calc_withdraw_one_coin(uint256 _burn_amount, int128 i) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ICurveMetapoolFactory {
        function get_coins(address _pool) external view returns (address[2]);
    }
}

// ── ERC20 ───────────────────────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

/// Names under which the compiled contracts are looked up.
pub const ADAPTER_ARTIFACT: &str = "CurveMetapoolSwapAdapter";
pub const TEST_ADAPTER_ARTIFACT: &str = "TestDeFiAdapter";

// ── Transaction helpers ─────────────────────────────────────────────

/// Attach the configured gas limit and price to a call.
pub fn with_overrides<P: Provider, D: CallDecoder>(
    call: CallBuilder<P, D>,
    overrides: &TxOverrides,
) -> CallBuilder<P, D> {
    let call = call.gas(overrides.gas_limit);
    match overrides.gas_price {
        Some(price) => call.gas_price(price),
        None => call,
    }
}

/// Send a call as a transaction and wait for a successful receipt.
pub async fn send<P: Provider, D: CallDecoder>(
    call: CallBuilder<P, D>,
    label: &str,
) -> Result<TransactionReceipt> {
    let receipt = call
        .send()
        .await
        .with_context(|| format!("sending {label}"))?
        .get_receipt()
        .await
        .with_context(|| format!("{label} receipt"))?;

    if !receipt.status() {
        return Err(HarnessError::Reverted {
            tx: format!("{label} ({})", receipt.transaction_hash),
        }
        .into());
    }
    Ok(receipt)
}
