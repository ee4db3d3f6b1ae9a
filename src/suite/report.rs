use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cycle::Outcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolResult {
    pub name: String,
    pub pool: Address,
    pub outcome: Outcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub generated_at: String,
    pub fork_block: Option<u64>,
    pub adapter: Address,
    pub harness: Address,
    pub results: Vec<PoolResult>,
}

impl SuiteReport {
    pub fn new(fork_block: Option<u64>, adapter: Address, harness: Address, results: Vec<PoolResult>) -> Self {
        SuiteReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            fork_block,
            adapter,
            harness,
            results,
        }
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))
    }

    pub fn print_table(&self) {
        println!("\n{}", "═".repeat(100));
        println!("  CurveMetapoolSwapAdapter results");
        println!("{}", "═".repeat(100));
        println!("  {:<24} {:<44} {:<8} {:>8}", "Pool", "Address", "Status", "Time(s)");
        println!("  {}", "-".repeat(94));
        for r in &self.results {
            let status = match &r.outcome {
                Outcome::Passed(_) => "passed",
                Outcome::Skipped { .. } => "skipped",
                Outcome::Failed { .. } => "failed",
            };
            println!(
                "  {:<24} {:<44} {:<8} {:>8.1}",
                r.name,
                r.pool.to_string(),
                status,
                r.elapsed_ms as f64 / 1000.0,
            );
            if let Outcome::Failed { error } = &r.outcome {
                println!("      {error}");
            }
        }
        println!("{}", "═".repeat(100));
        println!(
            "  {} passed, {} skipped, {} failed",
            self.passed(),
            self.skipped(),
            self.failed()
        );
    }
}
