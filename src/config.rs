//! Engine configuration.
//!
//! `StorageConfig` is the only configuration the core consumes. It is
//! deserializable from a TOML file and overridable from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const DEFAULT_THREAD_LIMIT: i32 = 20;
const DEFAULT_EXPIRE_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

fn default_base_path() -> String {
    env::temp_dir().join("brain").to_string_lossy().into_owned()
}

fn default_storage_provider() -> String {
    "memory".to_string()
}

fn default_thread_limit() -> i32 {
    DEFAULT_THREAD_LIMIT
}

fn default_expire_millis() -> i64 {
    DEFAULT_EXPIRE_MILLIS
}

/// Configuration for engine storage, scheduling, and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,

    #[serde(default = "default_storage_provider")]
    pub storage_provider: String,

    #[serde(default = "default_thread_limit")]
    pub thread_limit: i32,

    /// Additive cutoff offset for `drop_expired`; see `DESIGN.md` for why
    /// it's additive rather than subtractive. `-1` disables expiry.
    #[serde(default = "default_expire_millis")]
    pub expire_millis: i64,

    /// Monotonic tag used by the facade to decide whether to reinitialize.
    #[serde(default)]
    pub last_modified: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            storage_provider: default_storage_provider(),
            thread_limit: default_thread_limit(),
            expire_millis: default_expire_millis(),
            last_modified: 0,
        }
    }
}

impl StorageConfig {
    /// Loads config from a TOML file, applying environment overrides on top.
    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config.normalized())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("BRAIN_BASE_PATH") {
            self.base_path = value;
        }
        if let Ok(value) = env::var("BRAIN_STORAGE_PROVIDER") {
            self.storage_provider = value;
        }
        if let Ok(value) = env::var("BRAIN_THREAD_LIMIT") {
            if let Ok(parsed) = value.parse() {
                self.thread_limit = parsed;
            }
        }
        if let Ok(value) = env::var("BRAIN_EXPIRE_MILLIS") {
            if let Ok(parsed) = value.parse() {
                self.expire_millis = parsed;
            }
        }
    }

    /// Applies the defaulting/clamping rules: non-positive
    /// `thread_limit` falls back to the default, negative `expire_millis`
    /// other than `-1` falls back to the default.
    pub fn normalized(mut self) -> Self {
        if self.thread_limit <= 0 {
            self.thread_limit = DEFAULT_THREAD_LIMIT;
        }
        if self.expire_millis < -1 {
            self.expire_millis = DEFAULT_EXPIRE_MILLIS;
        }
        self
    }

    pub fn base_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.base_path)
    }
}
