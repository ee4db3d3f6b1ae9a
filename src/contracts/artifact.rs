use std::path::{Path, PathBuf};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

use crate::config::TxOverrides;
use crate::error::HarnessError;

/// Compiled contract read from a Hardhat or Foundry build directory.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Find `<Name>.sol/<Name>.json` anywhere below `dir` and read its creation bytecode.
    ///
    /// Hardhat stores `"bytecode": "0x…"`, Foundry `"bytecode": {"object": "0x…"}`.
    pub fn load(dir: &Path, name: &str) -> Result<Self, HarnessError> {
        let path = find_artifact(dir, name)?.ok_or_else(|| HarnessError::ArtifactNotFound {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        })?;

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let code = match &json["bytecode"] {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(o) => o.get("object").and_then(|v| v.as_str()),
            _ => None,
        };

        let bytecode = code
            .map(|s| s.trim_start_matches("0x"))
            .filter(|s| !s.is_empty())
            .and_then(|s| hex::decode(s).ok())
            .ok_or_else(|| HarnessError::ArtifactBytecode { path: path.clone() })?;

        Ok(Artifact {
            name: name.to_string(),
            path,
            bytecode: Bytes::from(bytecode),
        })
    }
}

fn find_artifact(dir: &Path, name: &str) -> Result<Option<PathBuf>, HarnessError> {
    let direct = dir.join(format!("{name}.sol")).join(format!("{name}.json"));
    if direct.is_file() {
        return Ok(Some(direct));
    }
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    entries.sort();

    for sub in entries {
        if let Some(found) = find_artifact(&sub, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Deploy `artifact` with ABI-encoded constructor arguments appended to its bytecode.
pub async fn deploy<P: Provider>(
    provider: &P,
    from: Address,
    artifact: &Artifact,
    constructor_args: &[u8],
    overrides: &TxOverrides,
) -> Result<Address> {
    let mut code = artifact.bytecode.to_vec();
    code.extend_from_slice(constructor_args);

    let mut tx = TransactionRequest::default()
        .with_from(from)
        .with_deploy_code(Bytes::from(code))
        .with_gas_limit(overrides.gas_limit);
    if let Some(price) = overrides.gas_price {
        tx = tx.with_gas_price(price);
    }

    let receipt = provider
        .send_transaction(tx)
        .await
        .with_context(|| format!("sending {} deployment", artifact.name))?
        .get_receipt()
        .await
        .with_context(|| format!("{} deployment receipt", artifact.name))?;

    if !receipt.status() {
        return Err(HarnessError::Reverted {
            tx: format!("deploy {} ({})", artifact.name, receipt.transaction_hash),
        }
        .into());
    }

    receipt
        .contract_address
        .with_context(|| format!("no contract address in {} receipt", artifact.name))
}
