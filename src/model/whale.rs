use std::collections::HashMap;
use std::path::Path;

use alloy::primitives::Address;

use crate::error::HarnessError;

/// Token → address holding a large balance of it.
pub type Whales = HashMap<Address, Address>;

pub fn load_whales(path: &Path) -> Result<Whales, HarnessError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
