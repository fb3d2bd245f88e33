//! Service configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present. Every
//! setting has a default, so the service starts with no configuration at all.
//! Values that fail to parse are logged and replaced by their default.

use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use common::model::role::Role;
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FREE_QUOTA: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub db_path: PathBuf,
    pub fonts_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Signatures allowed for the constrained role.
    pub free_quota: usize,
    /// Artificial delay of every in-memory repository call.
    pub latency: Duration,
    /// Identity used when a request carries no `X-User-Id`.
    pub default_user: String,
    pub default_role: Role,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::Sqlite,
            db_path: PathBuf::from("signatures.sqlite"),
            fonts_dir: PathBuf::from("./fonts"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            free_quota: DEFAULT_FREE_QUOTA,
            latency: Duration::ZERO,
            default_user: "local".to_string(),
            default_role: Role::Free,
        }
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            host: text("SIGNATURES_HOST", defaults.host),
            port: parsed(&lookup, "SIGNATURES_PORT", defaults.port),
            storage: parsed(&lookup, "SIGNATURES_STORAGE", defaults.storage),
            db_path: PathBuf::from(text(
                "SIGNATURES_DB_PATH",
                defaults.db_path.to_string_lossy().into_owned(),
            )),
            fonts_dir: PathBuf::from(text(
                "SIGNATURES_FONTS_DIR",
                defaults.fonts_dir.to_string_lossy().into_owned(),
            )),
            max_upload_bytes: parsed(
                &lookup,
                "SIGNATURES_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            ),
            free_quota: parsed(&lookup, "SIGNATURES_FREE_QUOTA", defaults.free_quota),
            latency: Duration::from_millis(parsed(&lookup, "SIGNATURES_LATENCY_MS", 0u64)),
            default_user: text("SIGNATURES_DEFAULT_USER", defaults.default_user),
            default_role: parsed(&lookup, "SIGNATURES_DEFAULT_ROLE", defaults.default_role),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            default
        }
    }
}
