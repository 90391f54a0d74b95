//! The general configuration settings for garden-index.
//!
//! This module defines the [General] struct for deserializing the `[general]` table of
//! garden.toml and the [InternalGeneral] struct used at runtime.
//!
//! It covers where the notes live, where root-level notes go, how deleted entries are disposed
//! of and how verbose logging is.

use crate::core::garden::DEFAULT_INBOX;
use crate::utils::expand_home_path;

use serde::Deserialize;

use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    root_dir: Option<String>,
    inbox_dir: String,
    move_to_trash: bool,
    dir_priority: bool,
    log_level: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            root_dir: None,
            inbox_dir: DEFAULT_INBOX.to_string(),
            move_to_trash: false,
            dir_priority: true,
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    root_dir: Option<PathBuf>,
    inbox_dir: PathBuf,
    move_to_trash: bool,
    dir_priority: bool,
    log_level: log::LevelFilter,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        Self {
            root_dir: g
                .root_dir
                .filter(|r| !r.trim().is_empty())
                .map(|r| expand_home_path(r.trim())),
            inbox_dir: PathBuf::from(g.inbox_dir),
            move_to_trash: g.move_to_trash,
            dir_priority: g.dir_priority,
            log_level: parse_log_level(&g.log_level),
        }
    }
}

impl InternalGeneral {
    /// Root of the notes tree, `None` when neither the file nor the environment sets one.
    #[inline]
    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    #[inline]
    pub fn inbox_dir(&self) -> &Path {
        &self.inbox_dir
    }

    #[inline]
    pub fn move_to_trash(&self) -> bool {
        self.move_to_trash
    }

    /// Directory priority written into newly created sidecars.
    #[inline]
    pub fn dir_priority(&self) -> bool {
        self.dir_priority
    }

    #[inline]
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level
    }

    pub(crate) fn set_root_dir(&mut self, root: PathBuf) {
        self.root_dir = Some(root);
    }
}

/// Parses a level name, falling back to `warn` on anything unknown.
fn parse_log_level(value: &str) -> log::LevelFilter {
    match log::LevelFilter::from_str(value.trim()) {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "[Warning] log_level={:?} is not a log level, using \"warn\"",
                value
            );
            log::LevelFilter::Warn
        }
    }
}
