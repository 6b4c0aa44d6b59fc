//! Tool configuration.
//!
//! Settings are read from an optional `ws-book.toml` and then overridden by
//! command-line flags. The resulting `Config` is passed explicitly to the
//! exporter, generators and converter; nothing reads process-global state, so
//! tests can point each run at its own scratch directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ws-book.toml";

/// External converter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// `ebook-convert` compatible command, either on `PATH` or an absolute path.
    pub command: String,
    /// Hard limit for a single conversion, in seconds.
    pub timeout_secs: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            command: "ebook-convert".to_string(),
            timeout_secs: 300,
        }
    }
}

impl ConvertConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where generators put their working files.
    pub temp_dir: PathBuf,
    /// Root of the local book library (`<library>/<lang>/<title>.json`).
    pub library: PathBuf,
    pub convert: ConvertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            library: PathBuf::from("library"),
            convert: ConvertConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration file at `path`, falling back to the defaults when
    /// it doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no configuration at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML in {}", path.display()))?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Replace the temporary directory, which must already exist.
    pub fn set_temp_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<&mut Self> {
        let dir = dir.as_ref();
        let canonical = std::fs::canonicalize(dir)
            .with_context(|| format!("{} does not exist.", dir.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("{} is not a directory.", dir.display());
        }
        self.temp_dir = canonical;
        Ok(self)
    }
}
