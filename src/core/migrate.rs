//! One-shot migration from the legacy `"3 - Name"` prefix convention.
//!
//! Walks a tree bottom-up, renames legacy prefixes to `"03. Name"` and rewrites empty `.index`
//! marker files into the structured sidecar format.

use crate::core::codec;
use crate::core::fs::FileSystem;
use crate::core::index_config::{self, IndexConfig};
use crate::error::{IoContext, Result};

use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub renamed: usize,
    /// Renames left out because the new name was already taken.
    pub skipped: usize,
    pub markers: usize,
}

/// Migrates `dir` (absolute path) and everything below it.
pub fn migrate(fs: &dyn FileSystem, dir: &Path) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();
    migrate_into(fs, dir, &mut report)?;
    log::info!(
        "Migrated {}: {} renamed, {} skipped, {} markers rewritten",
        dir.display(),
        report.renamed,
        report.skipped,
        report.markers
    );
    Ok(report)
}

fn migrate_into(fs: &dyn FileSystem, dir: &Path, report: &mut MigrationReport) -> Result<()> {
    let items = fs.list_dir(dir).at(dir)?;

    // Children first, so renaming a directory never invalidates a path still to be visited.
    for item in items
        .iter()
        .filter(|i| i.is_dir() && codec::is_managed(i.name(), true))
    {
        migrate_into(fs, &dir.join(item.name()), report)?;
    }

    for item in &items {
        if !codec::is_managed(item.name(), item.is_dir()) {
            continue;
        }
        let Some(new_name) = codec::migrate_legacy_name(item.name()) else {
            continue;
        };

        let from = dir.join(item.name());
        let to = dir.join(&new_name);
        if fs.exists(&to) {
            log::warn!(
                "Not migrating {}: {} already exists",
                from.display(),
                to.display()
            );
            report.skipped += 1;
            continue;
        }

        log::debug!("Renaming {} to {}", from.display(), to.display());
        fs.rename(&from, &to).at(&from)?;
        report.renamed += 1;
    }

    if index_config::is_legacy_marker(fs, dir)? {
        index_config::write(fs, dir, &IndexConfig::numeric(true))?;
        report.markers += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemFs;
    use crate::error::Result;

    #[test]
    fn migrates_nested_tree() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/1 - Inbox/2 - Draft.md");
        fs.touch("/g/1 - Inbox/.index");
        fs.touch("/g/3 - Notes.md");
        fs.touch("/g/4 - picture.png");
        fs.touch("/g/05. Done.md");

        let report = migrate(&fs, Path::new("/g"))?;

        assert_eq!(report.renamed, 3);
        assert_eq!(report.markers, 1);
        assert!(fs.exists(Path::new("/g/01. Inbox/02. Draft.md")));
        assert!(fs.exists(Path::new("/g/03. Notes.md")));
        assert!(fs.exists(Path::new("/g/4 - picture.png")));
        assert!(fs.exists(Path::new("/g/05. Done.md")));
        assert!(index_config::read(&fs, Path::new("/g/01. Inbox"))?.is_numeric());
        assert!(!index_config::is_legacy_marker(&fs, Path::new("/g/01. Inbox"))?);
        Ok(())
    }

    #[test]
    fn taken_names_are_skipped() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/1 - A.md");
        fs.touch("/g/01. A.md");

        let report = migrate(&fs, Path::new("/g"))?;
        assert_eq!(report.renamed, 0);
        assert_eq!(report.skipped, 1);
        assert!(fs.exists(Path::new("/g/1 - A.md")));
        Ok(())
    }
}
