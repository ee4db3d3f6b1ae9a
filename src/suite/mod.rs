pub mod cycle;
pub mod report;

use std::time::{Duration, Instant};

use alloy::primitives::Address;
use alloy::providers::DynProvider;
use alloy::sol_types::SolValue;
use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::config::{CheckConfig, ContractConfig, TxOverrides};
use crate::contracts::{self, ADAPTER_ARTIFACT, Artifact, TEST_ADAPTER_ARTIFACT};
use crate::fork::{ForkNode, Signers};
use crate::funding::{StorageFunding, WhaleFunding};
use crate::model::{LiquidityPool, PoolItem, Whales, pool, whale};

pub use cycle::{CycleReport, Outcome, SkipReason};
pub use report::{PoolResult, SuiteReport};

/// Whole tokens written into storage when funding the harness.
pub const STORAGE_FUNDING_TOKENS: u64 = 10_000;

/// Deployed adapter + harness on a fork, ready to run cycles.
pub struct Suite {
    provider: DynProvider,
    signers: Signers,
    adapter: Address,
    harness: Address,
    metapool_factory: Address,
    overrides: TxOverrides,
    storage: StorageFunding,
    whale: WhaleFunding,
    timeout: Duration,
}

impl Suite {
    /// Deploy `CurveMetapoolSwapAdapter(registry)` and `TestDeFiAdapter()` from the deployer account.
    pub async fn setup(
        fork: &ForkNode,
        config: &ContractConfig,
        whales: Whales,
        timeout: Duration,
    ) -> Result<Self> {
        let adapter_artifact = Artifact::load(&config.artifacts_dir, ADAPTER_ARTIFACT)?;
        let harness_artifact = Artifact::load(&config.artifacts_dir, TEST_ADAPTER_ARTIFACT)?;

        let deployer = fork.signers.deployer;
        let adapter = contracts::deploy(
            &fork.provider,
            deployer,
            &adapter_artifact,
            &config.registry.abi_encode(),
            &config.overrides,
        )
        .await?;
        let harness = contracts::deploy(
            &fork.provider,
            deployer,
            &harness_artifact,
            &[],
            &config.overrides,
        )
        .await?;
        info!(%adapter, %harness, registry = %config.registry, "contracts deployed");

        Ok(Suite {
            provider: fork.provider.clone(),
            signers: fork.signers,
            adapter,
            harness,
            metapool_factory: config.metapool_factory,
            overrides: config.overrides,
            storage: StorageFunding::new(fork.provider.clone(), STORAGE_FUNDING_TOKENS),
            whale: WhaleFunding::new(
                fork.provider.clone(),
                whales,
                fork.signers.admin,
                config.overrides,
            ),
            timeout,
        })
    }

    pub fn adapter(&self) -> Address {
        self.adapter
    }

    pub fn harness(&self) -> Address {
        self.harness
    }

    /// The harness is driven by the account that deployed it.
    pub fn harness_caller(&self) -> Address {
        self.signers.deployer
    }

    /// Run one pool's cycle under the suite timeout. Never returns an error:
    /// failures are folded into the outcome.
    pub async fn run_pool(&self, name: &str, pool: &PoolItem) -> PoolResult {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.cycle(name, pool)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Outcome::Failed {
                error: format!("{e:#}"),
            },
            Err(_) => {
                self.release_whale(pool).await;
                Outcome::Failed {
                    error: format!("timed out after {}s", self.timeout.as_secs()),
                }
            }
        };

        PoolResult {
            name: name.to_string(),
            pool: pool.pool,
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// A cycle dropped mid-funding can leave its whale impersonated.
    async fn release_whale(&self, pool: &PoolItem) {
        let Some(token) = pool.underlying() else { return };
        if let Err(e) = self.whale.release(token).await {
            warn!(%token, error = %format!("{e:#}"), "could not release whale");
        }
    }

    /// Run every pool whose name contains `filter`, in registry order.
    pub async fn run(&self, pools: &LiquidityPool, filter: Option<&str>) -> Vec<PoolResult> {
        let mut results = Vec::new();
        for (name, pool) in pools {
            if filter.is_some_and(|f| !name.contains(f)) {
                continue;
            }
            println!("  {name}: deposit {} and withdraw LP tokens in pool {}", display_token(pool), pool.pool);
            let result = self.run_pool(name, pool).await;
            println!("    → {}", result.outcome);
            results.push(result);
        }
        results
    }
}

fn display_token(pool: &PoolItem) -> String {
    pool.underlying()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

// ── `check` command ─────────────────────────────────────────────────

/// Entry point for the `check` command.
pub fn run(config: &CheckConfig) -> Result<()> {
    let pools = pool::load_pools(&config.pools_file)
        .with_context(|| format!("loading pools from {}", config.pools_file.display()))?;
    let whales = whale::load_whales(&config.whales_file)
        .with_context(|| format!("loading whales from {}", config.whales_file.display()))?;

    println!("=== curve-metapool-harness check ===");
    println!("Pools:    {} ({})", pools.len(), config.pools_file.display());
    println!("Whales:   {}", whales.len());
    println!("Fork:     {}", config.fork.fork_url);
    if let Some(block) = config.fork.fork_block {
        println!("Block:    {block}");
    }
    println!("Timeout:  {}s per pool", config.timeout.as_secs());
    println!();

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let report = rt.block_on(run_async(config, &pools, whales))?;

    report.print_table();
    if let Some(path) = &config.output {
        report.save(path)?;
        println!("Report written to {}", path.display());
    }

    let failed = report.failed();
    if failed > 0 {
        bail!("{failed} pool(s) failed");
    }
    Ok(())
}

async fn run_async(config: &CheckConfig, pools: &LiquidityPool, whales: Whales) -> Result<SuiteReport> {
    let fork = ForkNode::spawn(&config.fork)?;
    let suite = Suite::setup(&fork, &config.contracts, whales, config.timeout).await?;

    println!("Adapter:  {}", suite.adapter());
    println!("Harness:  {}", suite.harness());
    println!();

    let results = suite.run(pools, config.pool_filter.as_deref()).await;
    Ok(SuiteReport::new(
        config.fork.fork_block,
        suite.adapter(),
        suite.harness(),
        results,
    ))
}
