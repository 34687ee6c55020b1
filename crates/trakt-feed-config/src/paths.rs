use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable that relocates every file the tool writes
pub const HOME_ENV: &str = "TRAKTFEED_HOME";

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("traktfeed");

        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("traktfeed.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Ok(base) = std::env::var(HOME_ENV) {
            if !base.trim().is_empty() {
                return Self::with_base(base);
            }
        }

        // Platform-specific paths (e.g., ~/.config/traktfeed on Linux)
        Self::new().unwrap_or_else(|_| Self::with_base(".traktfeed"))
    }
}
