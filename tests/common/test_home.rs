use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Isolated `DSLOCK_HOME` for CLI tests, removed on drop.
pub struct TestHomeGuard {
    dir: TempDir,
}

impl TestHomeGuard {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create test home directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> &Self {
        fs::write(self.dir.path().join("config.toml"), contents)
            .expect("Failed to write config.toml");
        self
    }
}
