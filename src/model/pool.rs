use std::collections::BTreeMap;
use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One Curve metapool as listed in the pool registry.
///
/// On disk the registry is a JSON object keyed by pool name:
/// `{"mim": {"pool": "0x5a6A…", "lpToken": "0x5a6A…", "tokens": ["0x99D8…"]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolItem {
    /// Swap contract of the metapool.
    pub pool: Address,
    /// LP token. Factory metapools are their own LP token.
    pub lp_token: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_vault: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_tokens: Option<Vec<Address>>,
    /// Underlying tokens a depositor has to provide.
    pub tokens: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl PoolItem {
    /// The token the adapter deposits.
    pub fn underlying(&self) -> Option<Address> {
        self.tokens.first().copied()
    }

    /// The adapter strategy only handles pools entered with a single token.
    pub fn is_single_asset(&self) -> bool {
        self.tokens.len() <= 1
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }
}

/// Pool registry keyed by pool name, iterated in name order.
pub type LiquidityPool = BTreeMap<String, PoolItem>;

pub fn load_pools(path: &Path) -> Result<LiquidityPool, HarnessError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"{
        "mim": {
            "pool": "0x5a6A4D54456819380173272A5E8E9B9904BdF41B",
            "lpToken": "0x5a6A4D54456819380173272A5E8E9B9904BdF41B",
            "tokens": ["0x99D8a9C45b2ecA8864373A26D1459e3Dff1e17F3"]
        },
        "ust-wormhole": {
            "pool": "0xCEAF7747579696A2F0bb206a14210e3c9e6fB269",
            "lpToken": "0xCEAF7747579696A2F0bb206a14210e3c9e6fB269",
            "tokens": [
                "0xa693B19d2931d498c5B318dF961919BB4aee87a5",
                "0x6c3F90f043a72FA612cbac8115EE7e52BDe6E490"
            ],
            "deprecated": true
        }
    }"#;

    #[test]
    fn parses_registry_keyed_by_name() {
        let pools: LiquidityPool = serde_json::from_str(REGISTRY).unwrap();
        assert_eq!(pools.len(), 2);

        let mim = &pools["mim"];
        assert_eq!(mim.pool, mim.lp_token);
        assert!(mim.is_single_asset());
        assert!(!mim.is_deprecated());
        assert_eq!(
            mim.underlying(),
            Some("0x99D8a9C45b2ecA8864373A26D1459e3Dff1e17F3".parse().unwrap())
        );
    }

    #[test]
    fn multi_token_pool_is_not_single_asset() {
        let pools: LiquidityPool = serde_json::from_str(REGISTRY).unwrap();
        let ust = &pools["ust-wormhole"];
        assert!(!ust.is_single_asset());
        assert!(ust.is_deprecated());
        assert!(ust.staking_vault.is_none());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let pools: LiquidityPool = serde_json::from_str(REGISTRY).unwrap();
        let json = serde_json::to_value(&pools["mim"]).unwrap();
        assert!(json.get("lpToken").is_some());
        assert!(json.get("stakingVault").is_none());
        assert!(json.get("deprecated").is_none());
    }
}
