#![allow(dead_code)]

use std::path::PathBuf;

/// Fixture documents shared with the library's integration tests.
pub fn document(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../eaflex-babel/tests/fixtures")
        .join(name)
}

/// Configuration matching the speakers and tiers of the fixture documents.
pub fn config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/eaflex.toml")
}
