//! Per-directory indexing strategy, persisted in a `.index` sidecar file.
//!
//! The sidecar holds a small JSON record:
//!
//! ```json
//! {
//!   "strategy": "Numeric",
//!   "numeric_config": {
//!     "dir_priority": true
//!   }
//! }
//! ```
//!
//! A missing sidecar means [Strategy::None]. Malformed content is surfaced as
//! [IndexError::ConfigParse] and never defaulted. The one exception is an empty file, which older
//! versions wrote as a bare "this directory is indexed" marker.

use crate::core::fs::FileSystem;
use crate::error::{IndexError, IoContext, Result};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the sidecar file inside a managed directory.
pub const INDEX_FILE: &str = ".index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    None,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericConfig {
    pub dir_priority: bool,
}

impl Default for NumericConfig {
    fn default() -> Self {
        NumericConfig { dir_priority: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    numeric_config: Option<NumericConfig>,
}

impl IndexConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn numeric(dir_priority: bool) -> Self {
        IndexConfig {
            strategy: Strategy::Numeric,
            numeric_config: Some(NumericConfig { dir_priority }),
        }
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.strategy == Strategy::Numeric
    }

    /// Whether directories are kept ahead of files. Defaults to `true` when unset.
    pub fn dir_priority(&self) -> bool {
        self.numeric_config.unwrap_or_default().dir_priority
    }
}

pub fn sidecar_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Reads the sidecar of the directory at `dir` (absolute path).
pub fn read(fs: &dyn FileSystem, dir: &Path) -> Result<IndexConfig> {
    let path = sidecar_path(dir);
    if !fs.exists(&path) {
        return Ok(IndexConfig::none());
    }

    let data = fs.read_file(&path).at(&path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        log::warn!(
            "{} is a legacy empty marker, reading it as numeric indexing",
            path.display()
        );
        return Ok(IndexConfig {
            strategy: Strategy::Numeric,
            numeric_config: None,
        });
    }

    serde_json::from_slice(&data).map_err(|source| IndexError::ConfigParse { path, source })
}

/// Persists `config`. [Strategy::None] removes the sidecar, which is a no-op when it is absent.
pub fn write(fs: &dyn FileSystem, dir: &Path, config: &IndexConfig) -> Result<()> {
    let path = sidecar_path(dir);

    if config.strategy == Strategy::None {
        if fs.exists(&path) {
            log::debug!("Removing {}", path.display());
            fs.remove(&path).at(&path)?;
        }
        return Ok(());
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|source| IndexError::ConfigParse {
            path: path.clone(),
            source,
        })?;
    log::debug!("Writing {} ({:?})", path.display(), config.strategy);
    fs.write_file(&path, json.as_bytes()).at(&path)
}

/// Whether the sidecar is an empty marker file from before the structured format.
pub fn is_legacy_marker(fs: &dyn FileSystem, dir: &Path) -> Result<bool> {
    let path = sidecar_path(dir);
    if !fs.exists(&path) {
        return Ok(false);
    }
    let data = fs.read_file(&path).at(&path)?;
    Ok(data.iter().all(u8::is_ascii_whitespace))
}
