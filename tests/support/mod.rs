#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway store directory for one test.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    pub fn write_blob(&self, key: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.blob_path(key);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_blob(&self, key: &str) -> Result<Value, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.blob_path(key))?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("todos.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// `todos` pointed at this store, with environment overrides cleared.
    pub fn cmd(&self) -> Command {
        let mut cmd = todos_cmd();
        cmd.env_remove("TODOS_KEY");
        cmd.arg("--store").arg(self.path());
        cmd
    }

    /// Run with `--json` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }

    /// Add a task and return its id.
    pub fn add(&self, title: &str, due: &str, priority: &str) -> u64 {
        self.json(&["add", title, "--due", due, "--priority", priority]);
        let list = self.json(&["list"]);
        list["data"]["tasks"]
            .as_array()
            .expect("tasks array")
            .iter()
            .filter(|task| task["title"].as_str() == Some(title))
            .filter_map(|task| task["id"].as_u64())
            .max()
            .expect("added task id")
    }
}

pub fn todos_cmd() -> Command {
    let mut cmd = Command::cargo_bin("todos").expect("binary");
    cmd.env_remove("TODOS_STORE");
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn titles(envelope: &Value) -> Vec<String> {
    envelope["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .filter_map(|task| task["title"].as_str().map(str::to_string))
        .collect()
}
