//! Server configuration.
//!
//! Loaded once at startup from a YAML file (path in the `OWLET_CONFIG`
//! environment variable) and shared read-only across all sessions.

use serde::Deserialize;
use std::path::PathBuf;

/// Default spool threshold for request bodies: 100 MiB.
pub const DEFAULT_SPOOL_THRESHOLD: usize = 100 * 1024 * 1024;

/// Default maximum read size for file delivery: 10 MiB.
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
    pub uploads: UploadConfig,
    pub templates: TemplateConfig,
    pub limits: LimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Upper bound on sessions processed concurrently.
    pub max_workers: usize,
    /// Listen backlog hint.
    pub backlog: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory static files are served from.
    pub root: PathBuf,
    /// URL prefix that routes to the static file handler.
    pub route_prefix: String,
    /// Honor If-Modified-Since and emit cache headers.
    pub cache: bool,
    /// Deliver whole files with chunked transfer encoding.
    pub chunked: bool,
    /// Honor Range requests.
    pub range: bool,
    /// Largest single read when streaming a file; oversized ranges are
    /// clamped to this rather than rejected.
    pub max_chunk_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files may be saved into.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template directory, exposed to handlers. Rendering itself lives
    /// outside this crate.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Bytes a request body may accumulate in memory before spilling
    /// to a temp file.
    pub spool_threshold: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            max_workers: 2,
            backlog: 1024,
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            route_prefix: "/static/".to_string(),
            cache: true,
            chunked: false,
            range: true,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("templates"),
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
        }
    }
}

impl Config {
    /// Loads configuration from the path in `OWLET_CONFIG`, falling back
    /// to built-in defaults when the variable is unset.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("OWLET_CONFIG") {
            Ok(path) => Self::from_file(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let cfg = serde_yaml::from_str(raw)?;
        Ok(cfg)
    }
}
