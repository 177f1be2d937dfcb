//! Shared test utilities for confdecl integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that ignores the host environment.
//! - Write temporary live configuration files.
//!
//! Invariants / Assumptions:
//! - `CONFDECL_CONFIG` and `RUST_LOG` are cleared unless a test sets them.

use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

/// Returns a hermetic `confdecl` command for integration testing.
pub fn confdecl_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("confdecl");
    cmd.env_remove("CONFDECL_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Write `content` to a temporary file ending in `suffix` (e.g. ".toml").
#[allow(dead_code)]
pub fn live_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp config");
    file.write_all(content.as_bytes())
        .expect("write temp config");
    file
}

/// Returns a `confdecl` command reading `file` as its live configuration.
#[allow(dead_code)]
pub fn confdecl_cmd_with_config(file: &NamedTempFile) -> Command {
    let mut cmd = confdecl_cmd();
    cmd.arg("--config").arg(file.path());
    cmd
}
