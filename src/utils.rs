//! Miscellaneous utility functions for garden-index.
//!
//! This module holds the [helpers] submodule, which provides home directory handling for
//! configured and printed paths, and the [cli] submodule with argument parsing and help.

pub mod cli;
pub mod helpers;

pub use helpers::{expand_home_path, get_home, shorten_home_path};
