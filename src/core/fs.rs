//! Filesystem access for the indexing engine.
//!
//! Every engine operation goes through the [FileSystem] trait so the directory on disk stays the
//! only state of record while tests can swap in [MemFs].
//!
//! [OsFs] is the real implementation used by the `gdn` binary. It optionally moves removed
//! entries to the platform trash instead of deleting them.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One child of a listed directory, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    name: String,
    is_dir: bool,
}

impl DirItem {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        DirItem {
            name: name.into(),
            is_dir,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    is_dir: bool,
    len: u64,
}

impl Stat {
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The narrow set of filesystem calls the engine needs.
pub trait FileSystem {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirItem>>;

    fn stat(&self, path: &Path) -> io::Result<Stat>;

    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }

    /// Creates a new file. Fails with `AlreadyExists` instead of truncating.
    fn create_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes a file or a whole directory tree.
    fn remove(&self, path: &Path) -> io::Result<()>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates or overwrites a file.
    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [FileSystem] over `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs {
    move_to_trash: bool,
}

impl OsFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trash(move_to_trash: bool) -> Self {
        OsFs { move_to_trash }
    }
}

impl FileSystem for OsFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        let mut items = Vec::with_capacity(64);

        for entry in fs::read_dir(path)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let ft = match entry.file_type() {
                Ok(ft) => ft,
                Err(_) => continue,
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::debug!("Skipping non UTF-8 entry {:?}", raw);
                    continue;
                }
            };

            // Symlinked directories count as directories.
            let is_dir = if ft.is_symlink() {
                fs::metadata(entry.path()).map(|md| md.is_dir()).unwrap_or(false)
            } else {
                ft.is_dir()
            };

            items.push(DirItem::new(name, is_dir));
        }
        // read_dir order is platform dependent
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        let md = fs::metadata(path)?;
        Ok(Stat {
            is_dir: md.is_dir(),
            len: md.len(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn create_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if self.move_to_trash {
            return trash::delete(path).map_err(|e| io::Error::other(e.to_string()));
        }

        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

#[derive(Debug, Clone)]
struct MemNode {
    // None for directories
    data: Option<Vec<u8>>,
    seq: u64,
}

/// In-memory [FileSystem].
///
/// Children are listed in creation order, and a rename keeps an entry's position in that order.
/// Unlike POSIX, renaming onto an existing path fails with `AlreadyExists`.
#[derive(Debug, Default)]
pub struct MemFs {
    nodes: RefCell<BTreeMap<PathBuf, MemNode>>,
    seq: Cell<u64>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `path` and every missing ancestor as directories.
    pub fn mkdir_all(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut current = PathBuf::new();
        for comp in path.components() {
            current.push(comp);
            if !self.nodes.borrow().contains_key(&current) {
                let seq = self.next_seq();
                self.nodes
                    .borrow_mut()
                    .insert(current.clone(), MemNode { data: None, seq });
            }
        }
    }

    /// Creates an empty file, creating missing parents first.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.mkdir_all(parent);
        }
        let seq = self.next_seq();
        self.nodes.borrow_mut().insert(
            path.to_path_buf(),
            MemNode {
                data: Some(Vec::new()),
                seq,
            },
        );
    }

    /// Names of the direct children of `path` in enumeration order, directories suffixed with `/`.
    pub fn snapshot(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.list_dir(path.as_ref())
            .map(|items| {
                items
                    .into_iter()
                    .map(|i| {
                        if i.is_dir() {
                            format!("{}/", i.name())
                        } else {
                            i.name().to_string()
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn next_seq(&self) -> u64 {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        seq
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes.borrow().get(path), Some(MemNode { data: None, .. }))
    }

    fn require_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => {
                Err(not_found(parent))
            }
            _ => Ok(()),
        }
    }

    fn insert_new(&self, path: &Path, data: Option<Vec<u8>>) -> io::Result<()> {
        self.require_parent(path)?;
        if self.nodes.borrow().contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        let seq = self.next_seq();
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), MemNode { data, seq });
        Ok(())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl FileSystem for MemFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let nodes = self.nodes.borrow();
        let mut children: Vec<(u64, DirItem)> = nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_str()?;
                Some((node.seq, DirItem::new(name, node.data.is_none())))
            })
            .collect();
        children.sort_by_key(|(seq, _)| *seq);
        Ok(children.into_iter().map(|(_, item)| item).collect())
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        let nodes = self.nodes.borrow();
        let node = nodes.get(path).ok_or_else(|| not_found(path))?;
        Ok(Stat {
            is_dir: node.data.is_none(),
            len: node.data.as_ref().map_or(0, |d| d.len() as u64),
        })
    }

    fn create_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.insert_new(path, Some(contents.to_vec()))
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.insert_new(path, None)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if !self.nodes.borrow().contains_key(from) {
            return Err(not_found(from));
        }
        if self.nodes.borrow().contains_key(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        self.require_parent(to)?;

        let mut nodes = self.nodes.borrow_mut();
        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let rel = old.strip_prefix(from).unwrap_or(Path::new(""));
                let new = if rel.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rel)
                };
                nodes.insert(new, node);
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if !self.nodes.borrow().contains_key(path) {
            return Err(not_found(path));
        }
        self.nodes.borrow_mut().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let nodes = self.nodes.borrow();
        match nodes.get(path) {
            Some(MemNode {
                data: Some(data), ..
            }) => Ok(data.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.require_parent(path)?;
        if self.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        let existing = self.nodes.borrow().get(path).map(|n| n.seq);
        let seq = match existing {
            Some(seq) => seq,
            None => self.next_seq(),
        };
        self.nodes.borrow_mut().insert(
            path.to_path_buf(),
            MemNode {
                data: Some(contents.to_vec()),
                seq,
            },
        );
        Ok(())
    }
}
