//! The notes tree as seen from its root.
//!
//! [Garden] binds a root directory and a [FileSystem] together and exposes every engine
//! operation by entry name. It holds no directory state: each call loads what it needs, and the
//! [Directory] snapshots it hands out should be dropped after the mutation they were loaded for.

use crate::core::codec::{Entry, NOTE_EXTENSION};
use crate::core::directory::Directory;
use crate::core::fs::FileSystem;
use crate::core::index_config::{self, IndexConfig};
use crate::core::migrate::{self, MigrationReport};
use crate::core::mutator;
use crate::core::validator::{self, ValidationResult};
use crate::error::{IndexError, Result};

use std::path::{Path, PathBuf};

/// Inbox used for notes created at the root.
pub const DEFAULT_INBOX: &str = "01. Inbox";

#[derive(Debug)]
pub struct Garden<F: FileSystem> {
    root: PathBuf,
    inbox: PathBuf,
    fs: F,
}

impl<F: FileSystem> Garden<F> {
    pub fn new(root: impl Into<PathBuf>, fs: F) -> Self {
        Garden {
            root: root.into(),
            inbox: PathBuf::from(DEFAULT_INBOX),
            fs,
        }
    }

    /// Directory, relative to the root, that receives notes created at the root itself.
    pub fn with_inbox(mut self, inbox: impl Into<PathBuf>) -> Self {
        self.inbox = inbox.into();
        self
    }

    // Accessors

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    #[inline]
    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn load_directory(&self, rel: impl AsRef<Path>) -> Result<Directory> {
        Directory::load(&self.fs, &self.root, rel.as_ref())
    }

    pub fn read_config(&self, rel: impl AsRef<Path>) -> Result<IndexConfig> {
        index_config::read(&self.fs, &self.root.join(rel))
    }

    pub fn write_config(&self, rel: impl AsRef<Path>, config: &IndexConfig) -> Result<()> {
        index_config::write(&self.fs, &self.root.join(rel), config)
    }

    pub fn insert(&self, dir: &mut Directory, entry: Entry) -> Result<Option<PathBuf>> {
        mutator::insert(&self.fs, dir, entry)
    }

    pub fn delete(&self, dir: &mut Directory, key: &str) -> Result<bool> {
        let entry = dir.require(key)?;
        mutator::delete(&self.fs, dir, &entry)
    }

    pub fn move_up(&self, dir: &mut Directory, key: &str) -> Result<bool> {
        let entry = dir.require(key)?;
        mutator::move_up(&self.fs, dir, &entry)
    }

    pub fn move_down(&self, dir: &mut Directory, key: &str) -> Result<bool> {
        let entry = dir.require(key)?;
        mutator::move_down(&self.fs, dir, &entry)
    }

    pub fn move_to(&self, dir: &mut Directory, key: &str, index: u32) -> Result<bool> {
        let entry = dir.require(key)?;
        mutator::move_to(&self.fs, dir, &entry, index)
    }

    pub fn apply_numeric_indexing(&self, dir: &mut Directory, dir_priority: bool) -> Result<()> {
        mutator::apply_numeric_indexing(&self.fs, dir, dir_priority)
    }

    pub fn remove_indexing(&self, dir: &mut Directory) -> Result<()> {
        mutator::remove_indexing(&self.fs, dir)
    }

    pub fn validate(&self, dir: &Directory) -> ValidationResult {
        validator::validate(dir)
    }

    pub fn repair(&self, dir: &mut Directory) -> Result<()> {
        validator::repair(&self.fs, dir)
    }

    /// Creates a note at the end of `rel`, or in the inbox when `rel` is the root.
    ///
    /// Without a name the note is named after today's date (`2024-05-17`).
    pub fn create_note(&self, rel: impl AsRef<Path>, name: Option<&str>) -> Result<PathBuf> {
        let rel = rel.as_ref();
        let rel = if rel.as_os_str().is_empty() {
            self.inbox.as_path()
        } else {
            rel
        };

        let name = match name {
            Some(n) => n.strip_suffix(NOTE_EXTENSION).unwrap_or(n).to_string(),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };
        check_name(&name)?;

        let mut dir = self.load_directory(rel)?;
        let entry = Entry::note(mutator::next_file_index(&dir), name);
        let path = dir.entry_path(&entry);
        mutator::insert(&self.fs, &mut dir, entry)?;
        Ok(path)
    }

    /// Creates a directory after the last existing directory of `rel`.
    pub fn create_directory(&self, rel: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
        check_name(name)?;

        let mut dir = self.load_directory(rel)?;
        let entry = Entry::directory(mutator::next_dir_index(&dir), name);
        let path = dir.entry_path(&entry);
        mutator::insert(&self.fs, &mut dir, entry)?;
        Ok(path)
    }

    pub fn migrate(&self, rel: impl AsRef<Path>) -> Result<MigrationReport> {
        migrate::migrate(&self.fs, &self.root.join(rel))
    }
}

fn check_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR)
    {
        return Err(IndexError::InvalidName(name.to_string()));
    }
    Ok(())
}
