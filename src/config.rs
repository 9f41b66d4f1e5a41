use crate::error::{DsLockError, Result};
use crate::locking::{AcquireMode, LockRequest, RetryLimit};
use crate::rpc::Datastore;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.toml";
const HOME_ENV_VAR: &str = "DSLOCK_HOME";
const ENV_PREFIX: &str = "DSLOCK";
const DEFAULT_HOME_DIR: &str = ".dslock";
const DEFAULT_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DsLockConfig {
    #[serde(default)]
    pub locking: LockingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockingConfig {
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default)]
    pub blocking: bool,

    /// Retries after the first attempt; zero or negative waits forever.
    #[serde(default)]
    pub retries: i64,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            blocking: false,
            retries: 0,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

fn default_target() -> String {
    Datastore::CANDIDATE.to_string()
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl LockingConfig {
    pub fn retry_limit(&self) -> RetryLimit {
        RetryLimit::from_count(self.retries)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn lock_request(&self) -> Result<LockRequest> {
        let target = Datastore::new(&self.target).map_err(|e| {
            DsLockError::InvalidConfig(format!("locking.target '{}': {e}", self.target))
        })?;

        Ok(LockRequest::new(target)
            .with_mode(AcquireMode::from_blocking(self.blocking))
            .with_retries(self.retry_limit())
            .with_interval(self.interval()))
    }
}

impl DsLockConfig {
    /// Loads `config.toml` from `home` (if present), then applies
    /// `DSLOCK_LOCKING__<FIELD>` environment overrides.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(config_path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: DsLockConfig = settings.try_deserialize()?;
        config.locking.lock_request()?;
        Ok(config)
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let config_path = home.join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| DsLockError::ConfigError(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }
}

/// `$DSLOCK_HOME`, falling back to `~/.dslock`.
pub fn dslock_home() -> Result<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV_VAR)
        && !home.trim().is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| {
            DsLockError::ConfigError(format!(
                "Unable to determine home directory; set {HOME_ENV_VAR}"
            ))
        })
}

pub fn new_dslock_config() -> Result<DsLockConfig> {
    let home = dslock_home()?;
    DsLockConfig::load(&home)
}
