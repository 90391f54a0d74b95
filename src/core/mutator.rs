//! The ordering engine.
//!
//! Every mutation is a sequence of filesystem renames computed up front as a rename plan and run
//! by [run_plan]. A plan is checked before the first write: two renames may not share a target,
//! and a target may only be occupied by an entry that is itself about to move. While running,
//! a rename whose target is still held by a later source is parked under a hidden name and
//! finished once the rest of the plan is done.
//!
//! Plans are not transactional. When a rename fails midway the error is logged with the step
//! that failed and returned, and the directory is left partially renumbered. Run
//! [crate::core::validate] afterwards to see what is left to repair.
//!
//! All operations ignore the anchor entry (index 0): it is never moved, deleted or renumbered.
//! Moves that would cross a boundary are no-ops that return `Ok(false)`.

use crate::core::codec::{ANCHOR_INDEX, Entry};
use crate::core::directory::Directory;
use crate::core::fs::FileSystem;
use crate::core::index_config::{self, IndexConfig};
use crate::error::{IndexError, IoContext, Result};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A single pending rename inside one directory.
#[derive(Debug, Clone)]
struct Rename {
    from: Entry,
    to: Entry,
}

impl Rename {
    fn new(from: &Entry, index: Option<u32>) -> Self {
        Rename {
            from: from.clone(),
            to: from.with_index(index),
        }
    }

    fn is_noop(&self) -> bool {
        self.from.file_name() == self.to.file_name()
    }
}

/// Index for a new directory, `None` when the directory is not numerically indexed.
///
/// Without directory priority, directories and files share one sequence and this is the same as
/// [next_file_index].
pub fn next_dir_index(dir: &Directory) -> Option<u32> {
    if !dir.is_indexed() {
        return None;
    }
    if !dir.dir_priority() {
        return next_file_index(dir);
    }

    let max = dir
        .entries()
        .iter()
        .filter(|e| e.is_dir() && !e.is_anchor())
        .filter_map(Entry::index)
        .max()
        .unwrap_or(0);
    Some(max + 1)
}

/// Index for a new file, `None` when the directory is not numerically indexed.
pub fn next_file_index(dir: &Directory) -> Option<u32> {
    if !dir.is_indexed() {
        return None;
    }

    let max = dir
        .entries()
        .iter()
        .filter(|e| !e.is_anchor())
        .filter_map(Entry::index)
        .max()
        .unwrap_or(0);
    Some(max + 1)
}

/// First and last position an existing entry may occupy.
///
/// With directory priority, directories live in `1..=D` and files in `D+1..=D+F`.
fn territory(dir: &Directory, entry: &Entry) -> (u32, u32) {
    let next_dir = next_dir_index(dir).unwrap_or(1);
    let last = next_file_index(dir).unwrap_or(1).saturating_sub(1);

    if !dir.dir_priority() {
        return (1, last);
    }
    if entry.is_dir() {
        (1, next_dir.saturating_sub(1))
    } else {
        (next_dir, last)
    }
}

/// Positions a new entry may be inserted at: one past the end of its territory is allowed.
fn insert_range(dir: &Directory, entry: &Entry) -> (u32, u32) {
    let next_dir = next_dir_index(dir).unwrap_or(1);
    let next_file = next_file_index(dir).unwrap_or(1);

    if dir.dir_priority() && entry.is_dir() {
        (1, next_dir)
    } else if dir.dir_priority() {
        (next_dir, next_file)
    } else {
        (1, next_file)
    }
}

/// Inserts `entry` and creates it on disk. Returns the created path.
///
/// An indexed entry shifts every sibling at or above its index up by one, highest first. An
/// unindexed entry is simply created. The anchor index is skipped and returns `Ok(None)`.
pub fn insert(fs: &dyn FileSystem, dir: &mut Directory, entry: Entry) -> Result<Option<PathBuf>> {
    if entry.is_anchor() {
        log::debug!("Refusing to insert over the anchor position");
        return Ok(None);
    }

    if let Some(index) = entry.index() {
        if !dir.is_indexed() {
            return Err(IndexError::NotIndexed(dir.absolute_path().to_path_buf()));
        }

        let (min, max) = insert_range(dir, &entry);
        if index < min || index > max {
            return Err(IndexError::OutOfRange { index, min, max });
        }

        let mut shifted: Vec<&Entry> = dir
            .entries()
            .iter()
            .filter(|e| !e.is_anchor() && e.index().is_some_and(|i| i >= index))
            .collect();
        shifted.sort_by_key(|e| std::cmp::Reverse(e.index()));

        let plan = shifted
            .into_iter()
            .map(|e| Rename::new(e, e.index().map(|i| i + 1)))
            .collect();
        run_plan(fs, dir, plan, "insert")?;
    }

    let path = dir.entry_path(&entry);
    if fs.exists(&path) {
        return Err(IndexError::Collision(path));
    }
    create_on_disk(fs, &path, &entry)?;

    dir.entries_mut().push(entry);
    dir.sort();
    Ok(Some(path))
}

fn create_on_disk(fs: &dyn FileSystem, path: &Path, entry: &Entry) -> Result<()> {
    log::debug!("Creating {}", path.display());
    if entry.is_dir() {
        fs.create_dir(path).at(path)
    } else {
        let heading = format!("# {}\n\n", entry.name());
        fs.create_file(path, heading.as_bytes()).at(path)
    }
}

/// Removes `entry` from disk and closes the gap it leaves, lowest index first.
///
/// The shift is checked before anything is removed, treating the deleted name as free. The
/// entry is then removed before its successors shift down, so a successor may take its name.
pub fn delete(fs: &dyn FileSystem, dir: &mut Directory, entry: &Entry) -> Result<bool> {
    if entry.is_anchor() {
        log::debug!("Refusing to delete the anchor entry");
        return Ok(false);
    }
    if !dir.entries().contains(entry) {
        return Err(IndexError::NotFound(entry.file_name().to_string()));
    }

    let plan = match (dir.is_indexed(), entry.index()) {
        (true, Some(index)) => {
            let mut shifted: Vec<&Entry> = dir
                .entries()
                .iter()
                .filter(|e| *e != entry && !e.is_anchor())
                .filter(|e| e.index().is_some_and(|i| i > index))
                .collect();
            shifted.sort_by_key(|e| e.index());

            let plan = shifted
                .into_iter()
                .map(|e| Rename::new(e, e.index().map(|i| i - 1)))
                .collect();
            check_plan(fs, dir, plan, &[entry.file_name()])?
        }
        _ => Vec::new(),
    };

    let path = dir.entry_path(entry);
    log::debug!("Removing {}", path.display());
    fs.remove(&path).at(&path)?;
    dir.entries_mut().retain(|e| e != entry);

    execute_plan(fs, dir, plan, "delete")?;
    Ok(true)
}

/// Swaps `entry` with the entry one index above it.
pub fn move_up(fs: &dyn FileSystem, dir: &mut Directory, entry: &Entry) -> Result<bool> {
    let Some(index) = movable_index(dir, entry) else {
        return Ok(false);
    };
    let (first, _) = territory(dir, entry);
    if index <= first {
        log::debug!("{} is already at the top of its range", entry);
        return Ok(false);
    }
    swap(fs, dir, entry, index, index - 1)
}

/// Swaps `entry` with the entry one index below it.
pub fn move_down(fs: &dyn FileSystem, dir: &mut Directory, entry: &Entry) -> Result<bool> {
    let Some(index) = movable_index(dir, entry) else {
        return Ok(false);
    };
    let (_, last) = territory(dir, entry);
    if index >= last {
        log::debug!("{} is already at the bottom of its range", entry);
        return Ok(false);
    }
    swap(fs, dir, entry, index, index + 1)
}

/// The entry's index when it can take part in a move at all.
fn movable_index(dir: &Directory, entry: &Entry) -> Option<u32> {
    if !dir.is_indexed() || entry.is_anchor() {
        log::debug!("{} cannot be moved", entry);
        return None;
    }
    entry.index()
}

/// Exchanges positions with whichever entry holds `target`. With no entry there, `entry` just
/// takes the free index.
fn swap(
    fs: &dyn FileSystem,
    dir: &mut Directory,
    entry: &Entry,
    index: u32,
    target: u32,
) -> Result<bool> {
    if !dir.entries().contains(entry) {
        return Err(IndexError::NotFound(entry.file_name().to_string()));
    }

    let mut plan = Vec::with_capacity(2);
    if let Some(neighbor) = dir.get_by_index(target) {
        plan.push(Rename::new(neighbor, Some(index)));
    }
    plan.push(Rename::new(entry, Some(target)));

    run_plan(fs, dir, plan, "move")?;
    Ok(true)
}

/// Moves `entry` to `target` inside its own range, shifting the entries in between by one.
pub fn move_to(
    fs: &dyn FileSystem,
    dir: &mut Directory,
    entry: &Entry,
    target: u32,
) -> Result<bool> {
    if !dir.is_indexed() {
        return Err(IndexError::NotIndexed(dir.absolute_path().to_path_buf()));
    }
    let Some(index) = movable_index(dir, entry) else {
        return Ok(false);
    };
    if !dir.entries().contains(entry) {
        return Err(IndexError::NotFound(entry.file_name().to_string()));
    }

    let (min, max) = territory(dir, entry);
    if target < min || target > max {
        return Err(IndexError::OutOfRange {
            index: target,
            min,
            max,
        });
    }
    if target == index {
        return Ok(false);
    }

    let mut between: Vec<&Entry> = dir
        .entries()
        .iter()
        .filter(|e| !e.is_anchor() && *e != entry)
        .filter(|e| {
            e.index().is_some_and(|i| {
                if target < index {
                    i >= target && i < index
                } else {
                    i > index && i <= target
                }
            })
        })
        .collect();

    let mut plan: Vec<Rename> = if target < index {
        between.sort_by_key(|e| std::cmp::Reverse(e.index()));
        between
            .into_iter()
            .map(|e| Rename::new(e, e.index().map(|i| i + 1)))
            .collect()
    } else {
        between.sort_by_key(|e| e.index());
        between
            .into_iter()
            .map(|e| Rename::new(e, e.index().map(|i| i - 1)))
            .collect()
    };
    plan.push(Rename::new(entry, Some(target)));

    run_plan(fs, dir, plan, "move")?;
    Ok(true)
}

/// Turns `dir` into a numerically indexed directory.
///
/// Writes the sidecar, then numbers entries from 1 in their current order. With `dir_priority`
/// all directories come first, then all files, each group keeping its relative order.
/// Also used to repair an indexed directory: gaps, duplicates, index-0 entries other than the
/// anchor and non-canonical prefixes are all renumbered.
pub fn apply_numeric_indexing(
    fs: &dyn FileSystem,
    dir: &mut Directory,
    dir_priority: bool,
) -> Result<()> {
    let candidates = dir.entries().iter().filter(|e| !dir.is_anchor_entry(e));
    let ordered: Vec<&Entry> = if dir_priority {
        let (dirs, files): (Vec<&Entry>, Vec<&Entry>) = candidates.partition(|e| e.is_dir());
        dirs.into_iter().chain(files).collect()
    } else {
        candidates.collect()
    };

    let mut plan: Vec<Rename> = ordered
        .into_iter()
        .zip(1u32..)
        .map(|(e, i)| Rename::new(e, Some(i)))
        .collect();
    if let Some(anchor) = dir.anchor() {
        plan.push(Rename::new(anchor, Some(ANCHOR_INDEX)));
    }

    let plan = check_plan(fs, dir, plan, &[])?;
    let config = IndexConfig::numeric(dir_priority);
    index_config::write(fs, dir.absolute_path(), &config)?;
    dir.set_config(config);
    execute_plan(fs, dir, plan, "apply numeric indexing")?;

    log::info!("Applied numeric indexing to {}", dir.absolute_path().display());
    Ok(())
}

/// Removes the sidecar and strips the prefix from every entry except the anchor.
///
/// Entries that would end up with the same name (`01. A.md` and `02. A.md`) make the whole
/// operation fail with [IndexError::Collision] before anything is written.
pub fn remove_indexing(fs: &dyn FileSystem, dir: &mut Directory) -> Result<()> {
    let plan: Vec<Rename> = dir
        .entries()
        .iter()
        .filter(|e| !dir.is_anchor_entry(e) && e.is_indexed())
        .map(|e| Rename::new(e, None))
        .collect();

    let plan = check_plan(fs, dir, plan, &[])?;
    let config = IndexConfig::none();
    index_config::write(fs, dir.absolute_path(), &config)?;
    dir.set_config(config);
    execute_plan(fs, dir, plan, "remove indexing")?;

    log::info!("Removed indexing from {}", dir.absolute_path().display());
    Ok(())
}

fn run_plan(fs: &dyn FileSystem, dir: &mut Directory, plan: Vec<Rename>, op: &str) -> Result<()> {
    let plan = check_plan(fs, dir, plan, &[])?;
    execute_plan(fs, dir, plan, op)
}

/// Drops no-op renames and rejects plans that would overwrite anything.
///
/// `freed` names entries the caller removes before the plan runs.
fn check_plan(
    fs: &dyn FileSystem,
    dir: &Directory,
    plan: Vec<Rename>,
    freed: &[&str],
) -> Result<Vec<Rename>> {
    let plan: Vec<Rename> = plan.into_iter().filter(|r| !r.is_noop()).collect();

    {
        let sources: HashSet<&str> = plan.iter().map(|r| r.from.file_name()).collect();
        let mut targets: HashSet<&str> = HashSet::with_capacity(plan.len());

        for rename in &plan {
            let target = rename.to.file_name();
            let path = dir.absolute_path().join(target);

            if !targets.insert(target) {
                return Err(IndexError::Collision(path));
            }
            if !sources.contains(target) && !freed.contains(&target) && fs.exists(&path) {
                return Err(IndexError::Collision(path));
            }
        }
    }
    Ok(plan)
}

fn execute_plan(
    fs: &dyn FileSystem,
    dir: &mut Directory,
    plan: Vec<Rename>,
    op: &str,
) -> Result<()> {
    let total = plan.len();
    let mut parked: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (done, rename) in plan.iter().enumerate() {
        let from = dir.entry_path(&rename.from);
        let to = dir.entry_path(&rename.to);

        let result = if fs.exists(&to) {
            let temp = dir
                .absolute_path()
                .join(format!(".{}.gdn-swap", rename.to.file_name()));
            log::debug!("Parking {} as {}", from.display(), temp.display());
            let parked_rename = fs.rename(&from, &temp).at(&from);
            if parked_rename.is_ok() {
                parked.push((temp, to));
            }
            parked_rename
        } else {
            log::debug!("Renaming {} to {}", from.display(), to.display());
            fs.rename(&from, &to).at(&from)
        };

        if let Err(e) = result {
            log::error!(
                "{} stopped after {} of {} renames in {}: {}. The directory is partially renumbered, run validate.",
                op,
                done,
                total,
                dir.absolute_path().display(),
                e
            );
            return Err(e);
        }
    }

    for (temp, to) in parked {
        if fs.exists(&to) {
            log::error!(
                "{}: {} is still taken, {} left in place",
                op,
                to.display(),
                temp.display()
            );
            return Err(IndexError::Collision(to));
        }
        log::debug!("Renaming {} to {}", temp.display(), to.display());
        if let Err(e) = fs.rename(&temp, &to).at(&temp) {
            log::error!("{} failed to restore a parked entry: {}", op, e);
            return Err(e);
        }
    }

    let entries = dir.entries_mut();
    for rename in plan {
        if let Some(slot) = entries.iter_mut().find(|e| **e == rename.from) {
            *slot = rename.to;
        }
    }
    dir.sort();
    Ok(())
}
