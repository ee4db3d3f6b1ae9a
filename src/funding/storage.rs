use alloy::primitives::{Address, B256, U256, keccak256};
use alloy::providers::DynProvider;
use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{BalanceSource, FundingRoute};
use crate::contracts::IERC20;
use crate::error::HarnessError;
use crate::{expect, fork};

/// Storage slots probed for the `balanceOf` mapping.
pub const MAX_PROBE_SLOTS: u64 = 100;

/// How a compiler hashes a mapping key into a storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingLayout {
    /// `keccak256(key . slot)`
    Solidity,
    /// `keccak256(slot . key)`
    Vyper,
}

impl MappingLayout {
    pub fn balance_slot(self, holder: Address, slot: u64) -> B256 {
        let slot = U256::from(slot);
        match self {
            MappingLayout::Solidity => keccak256((holder, slot).abi_encode()),
            MappingLayout::Vyper => keccak256((slot, holder).abi_encode()),
        }
    }
}

/// Writes a balance straight into the token's `balanceOf` mapping.
pub struct StorageFunding {
    provider: DynProvider,
    whole_tokens: u64,
}

impl StorageFunding {
    pub fn new(provider: DynProvider, whole_tokens: u64) -> Self {
        StorageFunding {
            provider,
            whole_tokens,
        }
    }
}

#[async_trait]
impl BalanceSource for StorageFunding {
    fn route(&self) -> FundingRoute {
        FundingRoute::Storage
    }

    async fn fund(&self, token: Address, recipient: Address) -> Result<()> {
        let erc20 = IERC20::new(token, &self.provider);
        let decimals = erc20.decimals().call().await.context("decimals")?;
        let amount = expect::scale(self.whole_tokens, decimals);
        let value = B256::from(amount.to_be_bytes::<32>());

        for slot in 0..MAX_PROBE_SLOTS {
            for layout in [MappingLayout::Solidity, MappingLayout::Vyper] {
                let key = layout.balance_slot(recipient, slot);
                let original = fork::storage_at(&self.provider, token, key).await?;
                fork::set_storage_at(&self.provider, token, key, value).await?;

                let balance = erc20.balanceOf(recipient).call().await.context("balanceOf")?;
                if balance == amount {
                    debug!(%token, slot, ?layout, %amount, "balance slot found");
                    return Ok(());
                }
                fork::set_storage_at(&self.provider, token, key, original).await?;
            }
        }

        Err(HarnessError::StorageSlotNotFound {
            token,
            probed: MAX_PROBE_SLOTS,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_hash_key_and_slot_in_opposite_order() {
        let holder: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let solidity = MappingLayout::Solidity.balance_slot(holder, 2);
        let vyper = MappingLayout::Vyper.balance_slot(holder, 2);
        assert_ne!(solidity, vyper);

        let mut preimage = [0u8; 64];
        preimage[12..32].copy_from_slice(holder.as_slice());
        preimage[63] = 2;
        assert_eq!(solidity, keccak256(preimage));
    }
}
