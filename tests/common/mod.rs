//! Common test utilities for apiscope integration tests.
//!
//! Provides `TestEnv`, an isolated project directory the binary runs in.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated project directory.
///
/// The `apiscope()` method returns a `Command` that runs in the project
/// directory with `APISCOPE_ROOT` cleared, making tests parallel-safe and
/// independent of the caller's environment.
pub struct TestEnv {
    pub project_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty project directory.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and run `apiscope init` in it.
    pub fn init() -> Self {
        let env = Self::new();
        env.apiscope().arg("init").assert().success();
        env
    }

    /// Get a Command for the apiscope binary running in the project directory.
    pub fn apiscope(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_apiscope"));
        cmd.current_dir(self.project_dir.path());
        cmd.env_remove("APISCOPE_ROOT");
        cmd.env_remove("APISCOPE_LOG");
        cmd
    }

    /// Get the path to the project directory.
    pub fn path(&self) -> &Path {
        self.project_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("apiscope.ini")
    }

    /// Write `apiscope.ini` with the given content.
    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write apiscope.ini");
    }

    /// Read `apiscope.ini`.
    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read apiscope.ini")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
