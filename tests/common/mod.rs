//! Shared testing utilities for repokit CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Testing harness providing an isolated working directory and declaration
/// file for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Write a declaration file into the workspace and return its path.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("repokit.yml");
        fs::write(&path, content).expect("Failed to write declaration file");
        path
    }

    /// Build a command for invoking the compiled `repokit` binary within
    /// the workspace. The GitHub token is scrubbed from the environment so
    /// tests never reach the real API by accident.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("repokit").expect("Failed to locate repokit binary");
        cmd.current_dir(self.root.path()).env_remove("GITHUB_TOKEN");
        cmd
    }
}

/// Declaration with one Go service and one Rust library, automation branch
/// enabled.
#[allow(dead_code)]
pub fn sample_config() -> &'static str {
    r#"
owner: acme
author:
  name: Release Bot
  email: bot@acme.dev
contact_email: hello@acme.dev
security_email: security@acme.dev
fundings:
  github: [acme]
branch: automation
repositories:
  - name: widget
    title: Widget
    description: A widget service.
    language: go
    license: mit
    gitignore: true
    readme: true
    renovate: true
    changelog: true
    labels: [default, go]
    workflow:
      lint: true
      test: true
      versions: ["1.21", "1.22"]
  - name: gadget
    title: Gadget
    description: A gadget library.
    language: rust
    library: true
    readme: true
"#
}
