//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TUNEVAULT_ROOT_FOLDER";

/// Name of the service config file inside the root folder
pub const CONFIG_FILE_NAME: &str = "tunevault.toml";

/// Service configuration read from `tunevault.toml`
///
/// Every field has a default so a partial (or missing) file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Root folder override (only honored in the user-level config file)
    pub root_folder: Option<PathBuf>,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Catalog database file, relative paths resolve against the root folder
    pub database_file: PathBuf,
    pub logging: LoggingConfig,
    pub content_store: ContentStoreConfig,
    pub relational: RelationalConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1:5740".to_string(),
            database_file: PathBuf::from("catalog.db"),
            logging: LoggingConfig::default(),
            content_store: ContentStoreConfig::default(),
            relational: RelationalConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive, `RUST_LOG` takes precedence when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which content store backend serves blob fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    /// IPFS node reached through its HTTP RPC API
    Ipfs,
    /// Local sha256-addressed blob directory
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStoreConfig {
    pub backend: ContentBackend,
    pub ipfs_api_url: String,
    /// Blob directory for the `directory` backend, relative to the root folder
    pub blob_dir: PathBuf,
    /// Upper bound for one fetch attempt (open + full drain)
    pub fetch_timeout_ms: u64,
    /// Total attempts for a fetch, including the first
    pub fetch_attempts: u32,
    /// Initial retry backoff, doubled per attempt
    pub fetch_backoff_ms: u64,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::Ipfs,
            ipfs_api_url: "http://127.0.0.1:5001".to_string(),
            blob_dir: PathBuf::from("blobs"),
            fetch_timeout_ms: 10_000,
            fetch_attempts: 3,
            fetch_backoff_ms: 50,
        }
    }
}

impl ContentStoreConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationalConfig {
    /// Upper bound for a single relational query
    pub query_timeout_ms: u64,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5_000,
        }
    }
}

impl RelationalConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl TomlConfig {
    /// Load config from `path`
    ///
    /// Returns `None` when the file does not exist, leaving the caller to pick
    /// defaults and report it. A file that exists but does not parse is a
    /// configuration error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Absolute path of the catalog database
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        under_root(root_folder, &self.database_file)
    }

    /// Absolute path of the blob directory
    pub fn blob_dir(&self, root_folder: &Path) -> PathBuf {
        under_root(root_folder, &self.content_store.blob_dir)
    }
}

fn under_root(root_folder: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_folder.join(path)
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `root_folder` in the user config file
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root_folder) = user_config_file()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|content| toml::from_str::<toml::Value>(&content).ok())
        .and_then(|config| {
            config
                .get("root_folder")
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        })
    {
        return root_folder;
    }

    default_root_folder()
}

/// Ensure the root folder exists, creating it if missing
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
    }
    Ok(())
}

/// User-level config file, if one exists
fn user_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tunevault").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tunevault/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunevault"))
        .unwrap_or_else(|| PathBuf::from("./tunevault_data"))
}
