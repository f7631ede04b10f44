//! Session configuration.
//!
//! [`SessionConfig`] can be embedded in an application's own serde config,
//! or read from environment variables with [`SessionConfig::from_env`]:
//!
//! - `TIMELINE_BACKEND`: `memory` | `sqlite` | `file` (default: `memory`)
//! - `TIMELINE_DB_PATH`: SQLite database path (default: `timeline.db`)
//! - `TIMELINE_DATA_DIR`: directory for the file backend (default: `.timeline`)
//! - `TIMELINE_STORAGE_VERSION`: schema version in the storage key (default: `1`)
//! - `TIMELINE_COMPARE_VIEWPORT`: count viewport changes as edits (default: `false`)
//! - `TIMELINE_PERSIST`: persist after every change (default: `true`)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use timeline_core::ViewportPolicy;
use timeline_storage::{FileStore, InMemoryStore, KeyValueStore, SqliteStore, StorageError, StorageKey};

use crate::error::SessionError;

pub const ENV_BACKEND: &str = "TIMELINE_BACKEND";
pub const ENV_DB_PATH: &str = "TIMELINE_DB_PATH";
pub const ENV_DATA_DIR: &str = "TIMELINE_DATA_DIR";
pub const ENV_STORAGE_VERSION: &str = "TIMELINE_STORAGE_VERSION";
pub const ENV_COMPARE_VIEWPORT: &str = "TIMELINE_COMPARE_VIEWPORT";
pub const ENV_PERSIST: &str = "TIMELINE_PERSIST";

const DEFAULT_DB_PATH: &str = "timeline.db";
const DEFAULT_DATA_DIR: &str = ".timeline";

/// Where history is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// Nothing survives the process.
    #[default]
    Memory,
    Sqlite { path: PathBuf },
    File { dir: PathBuf },
}

impl Backend {
    /// Opens the configured store.
    pub fn open(&self) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let store: Box<dyn KeyValueStore> = match self {
            Backend::Memory => Box::new(InMemoryStore::new()),
            Backend::Sqlite { path } => Box::new(SqliteStore::new(&path.to_string_lossy())?),
            Backend::File { dir } => Box::new(FileStore::new(dir.clone())?),
        };
        Ok(store)
    }
}

/// Settings for a [`HistorySession`](crate::HistorySession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: Backend,
    pub storage_key: StorageKey,
    /// Whether camera moves count as state changes.
    pub viewport_policy: ViewportPolicy,
    /// Save the graph after every mutation.
    pub persist_on_change: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            backend: Backend::Memory,
            storage_key: StorageKey::default(),
            viewport_policy: ViewportPolicy::Ignore,
            persist_on_change: true,
        }
    }
}

impl SessionConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Unset and empty variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match var(ENV_BACKEND).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("memory") => Backend::Memory,
            Some("sqlite") => Backend::Sqlite {
                path: var(ENV_DB_PATH)
                    .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                    .into(),
            },
            Some("file") => Backend::File {
                dir: var(ENV_DATA_DIR)
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                    .into(),
            },
            Some(other) => {
                return Err(SessionError::Config(format!(
                    "{} must be memory, sqlite or file, got '{}'",
                    ENV_BACKEND, other
                )))
            }
        };

        let version = match var(ENV_STORAGE_VERSION) {
            None => StorageKey::CURRENT_VERSION,
            Some(v) => v.parse::<u32>().map_err(|e| {
                SessionError::Config(format!("{} '{}': {}", ENV_STORAGE_VERSION, v, e))
            })?,
        };

        let compare_viewport = parse_flag(ENV_COMPARE_VIEWPORT, var(ENV_COMPARE_VIEWPORT), false)?;
        let persist_on_change = parse_flag(ENV_PERSIST, var(ENV_PERSIST), true)?;

        Ok(SessionConfig {
            backend,
            storage_key: StorageKey::versioned(version),
            viewport_policy: if compare_viewport {
                ViewportPolicy::Compare
            } else {
                ViewportPolicy::Ignore
            },
            persist_on_change,
        })
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, SessionError> {
    let value = match value {
        Some(v) => v,
        None => return Ok(default),
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SessionError::Config(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}
