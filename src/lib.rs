//! Internal library crate for garden-index.
//!
//! The shipped application is the `gdn` binary (`src/main.rs`).
//!
//! This library exists to share code between targets (binary, tests) and to keep modules organized.
//! The engine lives in [core]; [app] maps CLI commands onto it.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
