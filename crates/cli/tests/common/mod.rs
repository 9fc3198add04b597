// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for CLI integration tests

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Nothing listens on the discard port, so every remote call fails fast
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";

/// Temp dir holding a config file and a data dir
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// `refill` with the config pinned and the environment cleared of overrides
    pub fn refill(&self) -> Command {
        let mut cmd = Command::cargo_bin("refill").unwrap();
        cmd.env_remove("REFILL_API_KEYS")
            .env_remove("REFILL_BASE_URL")
            .env_remove("REFILL_TIMEZONE")
            .env_remove("REFILL_DATA_DIR")
            .env("RUST_LOG", "warn")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }
}

/// Config with one account pointed at an unreachable endpoint
pub fn setup_test_env() -> TestEnv {
    setup_with_accounts("[[accounts]]\nid = \"alpha\"\napi_key = \"sk-test-0001-secret\"\n")
}

pub fn setup_with_accounts(accounts: &str) -> TestEnv {
    let env = TestEnv {
        dir: tempfile::tempdir().unwrap(),
    };
    let config = format!(
        "base_url = \"{}\"\nrequest_timeout = \"2s\"\ndata_dir = \"{}\"\nsettle_delay = \"0s\"\n\n{}",
        UNREACHABLE_BASE_URL,
        env.data_dir().display(),
        accounts
    );
    fs::write(env.config_path(), config).unwrap();
    env
}
