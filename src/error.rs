use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No artifact for `{name}` under {}", .dir.display())]
    ArtifactNotFound { name: String, dir: PathBuf },

    #[error("Artifact {} has no deployable bytecode", .path.display())]
    ArtifactBytecode { path: PathBuf },

    #[error("Could not locate the balance slot of token {token} in the first {probed} storage slots")]
    StorageSlotNotFound { token: Address, probed: u64 },

    #[error("No whale registered for token {token}")]
    MissingWhale { token: Address },

    #[error("Pool `{pool}` lists no underlying tokens")]
    EmptyPool { pool: String },

    #[error("{check}: expected {expected}, got {actual}")]
    Mismatch {
        check: &'static str,
        expected: U256,
        actual: U256,
    },

    #[error("{check}: {actual} is not above the floor {floor}")]
    BelowFloor {
        check: &'static str,
        actual: U256,
        floor: U256,
    },

    #[error("Transaction {tx} reverted")]
    Reverted { tx: String },
}
