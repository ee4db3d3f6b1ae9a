use std::path::Path;

use anyhow::{Context, Result};

use crate::model::pool;

/// Print the metapools in the registry, one per line.
pub fn run(pools_file: &Path) -> Result<()> {
    let pools = pool::load_pools(pools_file)
        .with_context(|| format!("loading pools from {}", pools_file.display()))?;

    println!("Curve metapools ({})", pools_file.display());
    println!("{}", "=".repeat(24));
    for (name, item) in &pools {
        let mut flags = Vec::new();
        if !item.is_single_asset() {
            flags.push("multi-token");
        }
        if item.is_deprecated() {
            flags.push("deprecated");
        }
        println!("  {name:<16} pool {}", item.pool);
        if item.lp_token != item.pool {
            println!("  {:<16} lp   {}", "", item.lp_token);
        }
        for token in &item.tokens {
            println!("  {:<16} in   {token}", "");
        }
        if !flags.is_empty() {
            println!("  {:<16} ({})", "", flags.join(", "));
        }
    }
    println!("\n{} pools", pools.len());
    Ok(())
}
