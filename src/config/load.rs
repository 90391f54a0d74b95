//! The main config loading module for garden-index.
//!
//! Handles loading and deserializing settings from `garden.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the [RawConfig] used for parsing.
//!
//! Also implements default config generation when `garden.toml` is not present.

use crate::config::{General, InternalGeneral};
use crate::utils::{expand_home_path, get_home};

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Environment variable naming the notes root. Takes precedence over `root_dir`.
pub const ROOT_ENV: &str = "GARDEN_LOG_DIR";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "GARDEN_CONFIG";

/// Raw configuration as read from the toml file
/// This struct is deserialized directly from the toml file.
/// It uses owned types and is then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
}

/// Main configuration struct for garden-index
#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
}

/// Conversion from RawConfig to Config
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
        }
    }
}

impl Config {
    /// Load configuration from the default path, then apply environment overrides.
    ///
    /// Called by the entry point once at startup. This is the only place the process environment
    /// is read; the engine receives the root as a plain value.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::default_path());
        if let Ok(root) = std::env::var(ROOT_ENV)
            && !root.trim().is_empty()
        {
            config.general.set_root_dir(expand_home_path(root.trim()));
        }
        config
    }

    /// Load configuration from `path`.
    /// If the file does not exist or fails to parse, returns the default configuration.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            eprintln!(
                "No garden.toml config file found. Using internal defaults. (Tip: run 'gdn --init' to generate a config file.)"
            );
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<RawConfig>(&content) {
                Ok(raw) => raw.into(),
                Err(e) => {
                    eprintln!("Error parsing config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    /// Determine the default configuration file path.
    /// Checks the GARDEN_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/garden/garden.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("garden/garden.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/garden/garden.toml");
        }
        PathBuf::from("garden.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let default_toml = r##"# garden.toml - default configuration for garden-index

# Note:
# Commented values are the internal defaults.
# The GARDEN_LOG_DIR environment variable overrides root_dir.

[general]
# Root of the notes tree. "~" is expanded.
root_dir = "~/notes"
# Notes created at the root go here (relative to root_dir).
# inbox_dir = "01. Inbox"
# Move deleted entries to the trash instead of removing them.
# move_to_trash = false
# Keep directories numbered before files when indexing a directory.
# dir_priority = true
# One of "off", "error", "warn", "info", "debug", "trace". RUST_LOG overrides it.
# log_level = "warn"
"##;

        fs::write(path, default_toml)?;
        println!("Default config generated at {:?}", path);
        Ok(())
    }
}

/// Default configuration options
impl Default for Config {
    fn default() -> Self {
        Config {
            general: InternalGeneral::from(General::default()),
        }
    }
}
