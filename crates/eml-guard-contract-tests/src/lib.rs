//! Helpers for loading the frozen JSON contracts under `contracts/`.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Repository `contracts/` directory.
pub fn contracts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../contracts")
}

/// Reads and parses a JSON document relative to [`contracts_dir`].
///
/// # Panics
/// Panics when the file is missing or not JSON; only tests call this.
pub fn load_contract_json(relative: &str) -> Value {
    let path = contracts_dir().join(relative);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("{} should be readable: {error}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|error| panic!("{} should be valid json: {error}", path.display()))
}
