//! Topping up the test harness with the token it is about to deposit.
//!
//! Two sources are tried in order: writing the balance straight into the
//! token's storage, then borrowing from a known holder ("whale").

pub mod storage;
pub mod whale;

use std::fmt;

use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use storage::StorageFunding;
pub use whale::WhaleFunding;

/// Something that can give `recipient` a balance of `token`.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    fn route(&self) -> FundingRoute;

    async fn fund(&self, token: Address, recipient: Address) -> Result<()>;
}

/// Which source ended up funding the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingRoute {
    Storage,
    Whale,
}

impl fmt::Display for FundingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingRoute::Storage => write!(f, "storage"),
            FundingRoute::Whale => write!(f, "whale"),
        }
    }
}

/// Fund from `primary`; on any error, log it and use `fallback` instead.
/// Only the fallback's error is returned.
pub async fn fund_with_fallback(
    primary: &dyn BalanceSource,
    fallback: &dyn BalanceSource,
    token: Address,
    recipient: Address,
) -> Result<FundingRoute> {
    match primary.fund(token, recipient).await {
        Ok(()) => Ok(primary.route()),
        Err(e) => {
            warn!(%token, route = %primary.route(), error = %format!("{e:#}"), "funding failed, falling back");
            fallback.fund(token, recipient).await?;
            info!(%token, route = %fallback.route(), "funded by fallback");
            Ok(fallback.route())
        }
    }
}
