//! Configuration for garden-index.
//!
//! The configuration lives in `garden.toml`:
//! - [load]: locating, parsing and generating the file (see [Config]).
//! - [general]: the `[general]` table (see [General] and [InternalGeneral]).

pub mod general;
pub mod load;

pub use general::{General, InternalGeneral};
pub use load::{Config, RawConfig};
