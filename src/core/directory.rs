//! Loaded snapshot of one managed directory.
//!
//! A [Directory] is built by a full scan at the start of every operation and dropped once the
//! operation completes. Nothing is cached between calls: after a mutation that renames entries
//! the caller reloads.
//!
//! Entries are held sorted by index (unindexed first), ties kept in enumeration order.

use crate::core::codec::{self, Entry};
use crate::core::fs::FileSystem;
use crate::core::index_config::{self, IndexConfig};
use crate::error::{IndexError, IoContext, Result};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
    absolute_path: PathBuf,
    config: IndexConfig,
    entries: Vec<Entry>,
}

impl Directory {
    /// Scans `root/rel` and reads its sidecar.
    ///
    /// Hidden names and files other than notes are never loaded.
    pub fn load(fs: &dyn FileSystem, root: &Path, rel: &Path) -> Result<Directory> {
        let absolute_path = if rel.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(rel)
        };

        let items = fs.list_dir(&absolute_path).at(&absolute_path)?;
        let entries = items
            .iter()
            .filter(|item| codec::is_managed(item.name(), item.is_dir()))
            .map(|item| codec::parse(item.name(), item.is_dir()))
            .collect();

        let config = index_config::read(fs, &absolute_path)?;

        let mut dir = Directory {
            path: rel.to_path_buf(),
            absolute_path,
            config,
            entries,
        };
        dir.sort();

        log::debug!(
            "Loaded {} ({} entries, {:?})",
            dir.absolute_path.display(),
            dir.entries.len(),
            dir.config.strategy()
        );
        Ok(dir)
    }

    // Accessors

    /// Path relative to the garden root.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.config.is_numeric()
    }

    /// Directories are kept ahead of files. Only meaningful when indexed.
    #[inline]
    pub fn dir_priority(&self) -> bool {
        self.config.dir_priority()
    }

    /// Entries in index order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn anchor(&self) -> Option<&Entry> {
        self.entries.iter().find(|e| e.is_anchor())
    }

    pub fn get_by_index(&self, index: u32) -> Option<&Entry> {
        self.entries.iter().find(|e| e.index() == Some(index))
    }

    /// Looks an entry up by its on-disk filename, then by its canonical name. A trailing `/` is
    /// ignored.
    pub fn get_by_name(&self, display_name: &str) -> Option<&Entry> {
        let wanted = display_name.strip_suffix('/').unwrap_or(display_name);
        self.entries
            .iter()
            .find(|e| e.file_name() == wanted)
            .or_else(|| self.entries.iter().find(|e| e.display_name() == wanted))
    }

    /// Whether `entry` is the one anchor of this directory: the first index-0 entry.
    pub fn is_anchor_entry(&self, entry: &Entry) -> bool {
        self.anchor() == Some(entry)
    }

    /// Lookup by filename first, then by a bare index such as `"3"` or `"03"`.
    pub fn get_entry(&self, key: &str) -> Option<&Entry> {
        self.get_by_name(key)
            .or_else(|| key.trim().parse::<u32>().ok().and_then(|i| self.get_by_index(i)))
    }

    /// Like [Directory::get_entry] but a miss is [IndexError::NotFound].
    pub fn require(&self, key: &str) -> Result<Entry> {
        self.get_entry(key)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(key.to_string()))
    }

    /// On-disk names in presentation order.
    ///
    /// This is alphabetical by the full display string, not the numeric index order the
    /// entries are held in. With two-digit prefixes both agree, but unindexed names and
    /// three-digit indices sort differently. External menus have always shown this order, so it
    /// is kept as is.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.file_name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Absolute path of `entry` inside this directory.
    pub fn entry_path(&self, entry: &Entry) -> PathBuf {
        self.absolute_path.join(entry.file_name())
    }

    pub(crate) fn set_config(&mut self, config: IndexConfig) {
        self.config = config;
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    /// Stable sort by index, keeping enumeration order among equal indices.
    pub(crate) fn sort(&mut self) {
        self.entries.sort_by_key(Entry::index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemFs;
    use std::error;
    use tempfile::tempdir;

    fn garden() -> MemFs {
        let fs = MemFs::new();
        fs.touch("/g/03. Todo.md");
        fs.touch("/g/00. Overview.md");
        fs.mkdir_all("/g/01. Projects");
        fs.touch("/g/02. Notes.md");
        fs.touch("/g/picture.png");
        fs.touch("/g/.hidden.md");
        fs.touch("/g/Loose.md");
        fs
    }

    #[test]
    fn load_filters_and_sorts() -> Result<()> {
        let fs = garden();
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;

        let names: Vec<String> = dir.entries().iter().map(Entry::display_name).collect();
        assert_eq!(
            names,
            vec![
                "Loose.md",
                "00. Overview.md",
                "01. Projects",
                "02. Notes.md",
                "03. Todo.md"
            ]
        );
        assert!(!dir.is_indexed());
        assert_eq!(dir.absolute_path(), Path::new("/g"));
        Ok(())
    }

    #[test]
    fn equal_indices_keep_enumeration_order() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/01. B.md");
        fs.touch("/g/01. A.md");
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;
        assert_eq!(dir.entries()[0].name(), "B");
        assert_eq!(dir.entries()[1].name(), "A");
        Ok(())
    }

    #[test]
    fn lookups() -> Result<()> {
        let fs = garden();
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;

        assert_eq!(dir.get_by_index(2).map(Entry::name), Some("Notes"));
        assert!(dir.get_by_index(9).is_none());
        assert!(dir.get_by_name("01. Projects/").is_some_and(Entry::is_dir));
        assert!(dir.get_by_name("nope.md").is_none());
        assert_eq!(dir.get_entry("3").map(Entry::name), Some("Todo"));
        assert_eq!(dir.anchor().map(Entry::name), Some("Overview"));
        assert!(matches!(dir.require("x.md"), Err(IndexError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn non_canonical_names_resolve_to_disk_paths() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/02.  Notes.md");
        fs.touch("/g/003. Todo.md");
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;

        let notes = dir.require("02.  Notes.md")?;
        assert_eq!(dir.entry_path(&notes), PathBuf::from("/g/02.  Notes.md"));
        let todo = dir.require("03. Todo.md")?;
        assert_eq!(dir.entry_path(&todo), PathBuf::from("/g/003. Todo.md"));
        assert_eq!(dir.list(), vec!["003. Todo.md", "02.  Notes.md"]);
        Ok(())
    }

    #[test]
    fn only_the_first_zero_entry_is_the_anchor() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/00. Overview.md");
        fs.touch("/g/00. Extra.md");
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;

        let overview = dir.require("00. Overview.md")?;
        let extra = dir.require("00. Extra.md")?;
        assert!(dir.is_anchor_entry(&overview));
        assert!(!dir.is_anchor_entry(&extra));
        Ok(())
    }

    #[test]
    fn list_is_alphabetical() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/100. Late.md");
        fs.touch("/g/02. Early.md");
        fs.touch("/g/Apple.md");
        let dir = Directory::load(&fs, Path::new("/g"), Path::new(""))?;

        assert_eq!(dir.entries()[2].name(), "Late");
        assert_eq!(dir.list(), vec!["02. Early.md", "100. Late.md", "Apple.md"]);
        Ok(())
    }

    #[test]
    fn load_reads_sidecar_of_nested_directory() -> Result<()> {
        let fs = MemFs::new();
        fs.mkdir_all("/g/01. Inbox");
        index_config::write(
            &fs,
            Path::new("/g/01. Inbox"),
            &IndexConfig::numeric(true),
        )?;

        let dir = Directory::load(&fs, Path::new("/g"), Path::new("01. Inbox"))?;
        assert!(dir.is_indexed());
        assert!(dir.is_empty());
        assert_eq!(dir.path(), Path::new("01. Inbox"));
        Ok(())
    }

    #[test]
    fn load_missing_directory_is_io_error() -> std::result::Result<(), Box<dyn error::Error>> {
        let tmp = tempdir()?;
        let fs = crate::core::fs::OsFs::new();
        let result = Directory::load(&fs, tmp.path(), Path::new("does/not/exist"));
        assert!(matches!(result, Err(IndexError::Io { .. })));
        Ok(())
    }
}
