//! Consistency checks for numerically indexed directories.
//!
//! [validate] reports problems as data and never touches the disk. [repair] is the only
//! corrective action and always has to be called explicitly.

use crate::core::codec::Entry;
use crate::core::directory::Directory;
use crate::core::fs::FileSystem;
use crate::core::mutator;
use crate::error::{IndexError, Result};

use std::collections::BTreeMap;
use std::fmt;

/// One class of problem found by [validate].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    Unindexed(usize),
    Duplicates(usize),
    Gaps(usize),
    /// Prefixes such as `002.` or `02.  ` that are read as an index but not written that way.
    Misnamed(usize),
    /// A directory is numbered after a file while directory priority is on.
    DirectoryAfterFile(String),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Unindexed(n) => write!(f, "Found {} unindexed entries", n),
            Issue::Duplicates(n) => write!(f, "Found {} duplicate indices", n),
            Issue::Gaps(n) => write!(f, "Found {} gaps in indexing", n),
            Issue::Misnamed(n) => write!(f, "Found {} non-canonical index prefixes", n),
            Issue::DirectoryAfterFile(name) => {
                write!(f, "Directory {:?} is numbered after a file", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    issues: Vec<Issue>,
    missing_gaps: Vec<u32>,
    duplicates: BTreeMap<u32, Vec<String>>,
    unindexed: Vec<String>,
    misnamed: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        ValidationResult {
            valid: true,
            issues: Vec::new(),
            missing_gaps: Vec::new(),
            duplicates: BTreeMap::new(),
            unindexed: Vec::new(),
            misnamed: Vec::new(),
        }
    }
}

impl ValidationResult {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Indices in `1..=max` held by no entry.
    #[inline]
    pub fn missing_gaps(&self) -> &[u32] {
        &self.missing_gaps
    }

    /// Filenames sharing an index, keyed by that index.
    #[inline]
    pub fn duplicates(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.duplicates
    }

    /// Filenames without a prefix, plus any index-0 entry beyond the anchor.
    #[inline]
    pub fn unindexed(&self) -> &[String] {
        &self.unindexed
    }

    /// Filenames whose prefix differs from the canonical `NN. ` form.
    #[inline]
    pub fn misnamed(&self) -> &[String] {
        &self.misnamed
    }
}

/// Checks the on-disk numbering of `dir`.
///
/// An unindexed directory is always valid.
pub fn validate(dir: &Directory) -> ValidationResult {
    let mut result = ValidationResult::default();
    if !dir.is_indexed() {
        return result;
    }

    let mut by_index: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    let mut numbered: Vec<&Entry> = Vec::with_capacity(dir.len());
    let mut anchor_seen = false;

    for entry in dir.entries() {
        if !entry.is_canonical() {
            result.misnamed.push(entry.file_name().to_string());
        }
        match entry.index() {
            Some(0) if !anchor_seen => anchor_seen = true,
            Some(0) | None => result.unindexed.push(entry.file_name().to_string()),
            Some(i) => {
                by_index
                    .entry(i)
                    .or_default()
                    .push(entry.file_name().to_string());
                numbered.push(entry);
            }
        }
    }

    result.duplicates = by_index
        .iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(i, names)| (*i, names.clone()))
        .collect();

    let max = by_index.keys().next_back().copied().unwrap_or(0);
    result.missing_gaps = (1..=max).filter(|i| !by_index.contains_key(i)).collect();

    if !result.unindexed.is_empty() {
        result.issues.push(Issue::Unindexed(result.unindexed.len()));
    }
    if !result.duplicates.is_empty() {
        result.issues.push(Issue::Duplicates(result.duplicates.len()));
    }
    if !result.missing_gaps.is_empty() {
        result.issues.push(Issue::Gaps(result.missing_gaps.len()));
    }
    if !result.misnamed.is_empty() {
        result.issues.push(Issue::Misnamed(result.misnamed.len()));
    }

    if dir.dir_priority() {
        let mut found_file = false;
        for entry in numbered {
            if !entry.is_dir() {
                found_file = true;
            } else if found_file {
                result
                    .issues
                    .push(Issue::DirectoryAfterFile(entry.file_name().to_string()));
            }
        }
    }

    result.valid = result.issues.is_empty();
    result
}

/// Renumbers an indexed directory in place, keeping its stored directory priority.
pub fn repair(fs: &dyn FileSystem, dir: &mut Directory) -> Result<()> {
    if !dir.is_indexed() {
        return Err(IndexError::NotIndexed(dir.absolute_path().to_path_buf()));
    }
    let dir_priority = dir.dir_priority();
    mutator::apply_numeric_indexing(fs, dir, dir_priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemFs;
    use crate::core::index_config::{self, IndexConfig};
    use std::path::Path;

    fn indexed(names: &[(&str, bool)], dir_priority: bool) -> Result<MemFs> {
        let fs = MemFs::new();
        fs.mkdir_all("/g");
        for (name, is_dir) in names {
            if *is_dir {
                fs.mkdir_all(Path::new("/g").join(name));
            } else {
                fs.touch(Path::new("/g").join(name));
            }
        }
        index_config::write(&fs, Path::new("/g"), &IndexConfig::numeric(dir_priority))?;
        Ok(fs)
    }

    fn load(fs: &MemFs) -> Result<Directory> {
        Directory::load(fs, Path::new("/g"), Path::new(""))
    }

    #[test]
    fn clean_directory_is_valid() -> Result<()> {
        let fs = indexed(
            &[
                ("00. Overview.md", false),
                ("01. Projects", true),
                ("02. Notes.md", false),
            ],
            true,
        )?;
        let result = validate(&load(&fs)?);
        assert!(result.is_valid());
        assert!(result.issues().is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_and_gap() -> Result<()> {
        let fs = indexed(
            &[("01. A.md", false), ("01. B.md", false), ("03. C.md", false)],
            true,
        )?;
        let result = validate(&load(&fs)?);

        assert!(!result.is_valid());
        assert_eq!(result.missing_gaps(), &[2]);
        assert_eq!(
            result.duplicates().get(&1),
            Some(&vec!["01. A.md".to_string(), "01. B.md".to_string()])
        );
        assert_eq!(result.duplicates().len(), 1);
        assert!(result.unindexed().is_empty());
        Ok(())
    }

    #[test]
    fn unindexed_and_second_anchor() -> Result<()> {
        let fs = indexed(
            &[
                ("00. Overview.md", false),
                ("00. Extra.md", false),
                ("Loose.md", false),
                ("01. A.md", false),
            ],
            true,
        )?;
        let result = validate(&load(&fs)?);

        assert!(!result.is_valid());
        assert_eq!(result.unindexed(), &["Loose.md", "00. Extra.md"]);
        assert_eq!(result.issues(), &[Issue::Unindexed(2)]);
        Ok(())
    }

    #[test]
    fn directory_after_file_is_its_own_issue() -> Result<()> {
        let fs = indexed(&[("01. A.md", false), ("02. Sub", true)], true)?;
        let result = validate(&load(&fs)?);

        assert!(!result.is_valid());
        assert!(result.missing_gaps().is_empty());
        assert!(result.duplicates().is_empty());
        assert_eq!(
            result.issues(),
            &[Issue::DirectoryAfterFile("02. Sub".to_string())]
        );
        Ok(())
    }

    #[test]
    fn interleaving_is_fine_without_dir_priority() -> Result<()> {
        let fs = indexed(&[("01. A.md", false), ("02. Sub", true)], false)?;
        assert!(validate(&load(&fs)?).is_valid());
        Ok(())
    }

    #[test]
    fn unindexed_directory_is_always_valid() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/01. A.md");
        fs.touch("/g/01. B.md");
        assert!(validate(&load(&fs)?).is_valid());
        Ok(())
    }

    #[test]
    fn validate_does_not_touch_disk() -> Result<()> {
        let fs = indexed(&[("01. A.md", false), ("03. C.md", false)], true)?;
        let before = fs.snapshot("/g");
        let _ = validate(&load(&fs)?);
        assert_eq!(fs.snapshot("/g"), before);
        Ok(())
    }

    #[test]
    fn repair_fixes_what_validate_reports() -> Result<()> {
        let fs = indexed(
            &[
                ("01. A.md", false),
                ("02. A.md", false),
                ("05. Sub", true),
                ("Loose.md", false),
            ],
            true,
        )?;
        let mut dir = load(&fs)?;
        assert!(!validate(&dir).is_valid());

        repair(&fs, &mut dir)?;
        assert!(validate(&dir).is_valid());

        let reloaded = load(&fs)?;
        assert!(validate(&reloaded).is_valid());
        let names: Vec<String> = reloaded.entries().iter().map(Entry::display_name).collect();
        assert_eq!(
            names,
            vec!["01. Sub", "02. Loose.md", "03. A.md", "04. A.md"]
        );
        Ok(())
    }

    #[test]
    fn non_canonical_prefixes_are_reported_and_repaired() -> Result<()> {
        let fs = indexed(
            &[
                ("001. A.md", false),
                ("002. B.md", false),
                ("03.  C.md", false),
            ],
            true,
        )?;
        let mut dir = load(&fs)?;
        let result = validate(&dir);

        assert!(!result.is_valid());
        assert_eq!(result.misnamed(), &["001. A.md", "002. B.md", "03.  C.md"]);
        assert_eq!(result.issues(), &[Issue::Misnamed(3)]);

        repair(&fs, &mut dir)?;
        assert_eq!(
            fs.snapshot("/g"),
            vec!["01. A.md", "02. B.md", "03. C.md", ".index"]
        );
        assert!(validate(&load(&fs)?).is_valid());
        Ok(())
    }

    #[test]
    fn repair_renumbers_extra_zero_entries() -> Result<()> {
        let fs = indexed(
            &[
                ("00. Overview.md", false),
                ("00. Extra.md", false),
                ("01. A.md", false),
            ],
            true,
        )?;
        let mut dir = load(&fs)?;
        assert_eq!(validate(&dir).unindexed(), &["00. Extra.md"]);

        repair(&fs, &mut dir)?;
        let reloaded = load(&fs)?;
        assert!(validate(&reloaded).is_valid());
        let names: Vec<String> = reloaded.entries().iter().map(Entry::display_name).collect();
        assert_eq!(names, vec!["00. Overview.md", "01. Extra.md", "02. A.md"]);
        Ok(())
    }

    #[test]
    fn repair_requires_numeric_strategy() -> Result<()> {
        let fs = MemFs::new();
        fs.touch("/g/a.md");
        let mut dir = load(&fs)?;
        assert!(matches!(
            repair(&fs, &mut dir),
            Err(IndexError::NotIndexed(_))
        ));
        Ok(())
    }
}
