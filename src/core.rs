//! Indexing engine for garden-index.
//!
//! This module holds everything that reads or renames entries of a notes directory:
//! - [codec]: the `"NN. Name.md"` filename convention (see [Entry], [parse], [format]).
//! - [directory]: loading one directory into an index-ordered [Directory] snapshot.
//! - [mutator]: insert, delete, moves and bulk renumbering, all as filesystem renames.
//! - [validator]: gap, duplicate and ordering checks plus the explicit [repair].
//! - [index_config]: the `.index` sidecar holding a directory's [IndexConfig].
//! - [fs]: the [FileSystem] trait, the real [OsFs] and the in-memory [MemFs].
//! - [garden]: [Garden], the root-bound entry point used by the binary.
//! - [migrate]: conversion from the legacy `"3 - Name"` convention.
//!
//! Most callers only need [Garden] and the types it returns.

pub mod codec;
pub mod directory;
pub mod fs;
pub mod garden;
pub mod index_config;
pub mod migrate;
pub mod mutator;
pub mod validator;

pub use codec::{Entry, NOTE_EXTENSION, format, is_managed, parse};
pub use directory::Directory;
pub use fs::{DirItem, FileSystem, MemFs, OsFs};
pub use garden::Garden;
pub use index_config::{INDEX_FILE, IndexConfig, Strategy};
pub use migrate::MigrationReport;
pub use mutator::{
    apply_numeric_indexing, delete, insert, move_down, move_to, move_up, next_dir_index,
    next_file_index, remove_indexing,
};
pub use validator::{Issue, ValidationResult, repair, validate};
