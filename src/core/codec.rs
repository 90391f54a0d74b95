//! The `"NN. Name.ext"` filename convention.
//!
//! Parses on-disk names into [Entry] values and formats them back. Parsing never fails: a name
//! without a numeric prefix is simply an unindexed entry.
//!
//! Indices below 100 are written with two digits. Wider indices are written with as many digits
//! as they need, and the parser accepts any prefix of two or more digits so both round-trip.
//!
//! The parser is lenient about the prefix (`002. B.md`, `02.  B.md`), so an [Entry] keeps the
//! filename it was read from. Renames always start from that name and always produce the
//! canonical one.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Extension of the only file type the engine manages.
pub const NOTE_EXTENSION: &str = ".md";

/// Index reserved for the fixed anchor entry.
pub const ANCHOR_INDEX: u32 = 0;

static PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2,})\.\s+(.+)$").expect("valid index prefix regex"));

/// The `"3 - Name"` convention used before the two-digit prefix.
static LEGACY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\s-\s(.+)$").expect("valid legacy prefix regex"));

/// One managed filesystem object inside a directory: a directory or a `.md` note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    index: Option<u32>,
    name: String,
    extension: String,
    is_dir: bool,
    file_name: String,
}

impl Entry {
    /// A note file. `name` excludes both the prefix and the extension.
    pub fn note(index: Option<u32>, name: impl Into<String>) -> Self {
        Entry {
            index,
            name: name.into(),
            extension: NOTE_EXTENSION.to_string(),
            is_dir: false,
            file_name: String::new(),
        }
        .canonical()
    }

    pub fn directory(index: Option<u32>, name: impl Into<String>) -> Self {
        Entry {
            index,
            name: name.into(),
            extension: String::new(),
            is_dir: true,
            file_name: String::new(),
        }
        .canonical()
    }

    fn canonical(mut self) -> Self {
        self.file_name = self.display_name();
        self
    }

    // Accessors

    /// `None` when the entry carries no numeric prefix.
    #[inline]
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty for directories, includes the leading dot for files.
    #[inline]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// The name this entry has on disk. Differs from [Entry::display_name] only for entries
    /// parsed from a non-canonical prefix.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.file_name == self.display_name()
    }

    #[inline]
    pub fn is_anchor(&self) -> bool {
        self.index == Some(ANCHOR_INDEX)
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// The same entry under another index, canonically named. The caller renames on disk.
    pub fn with_index(&self, index: Option<u32>) -> Self {
        Entry {
            index,
            ..self.clone()
        }
        .canonical()
    }

    /// The canonical filename for this entry's index and name.
    pub fn display_name(&self) -> String {
        match self.index {
            Some(i) => format!("{:02}. {}{}", i, self.name, self.extension),
            None => format!("{}{}", self.name, self.extension),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Parses an on-disk filename.
pub fn parse(filename: &str, is_dir: bool) -> Entry {
    let (index, rest) = match PREFIX_RE.captures(filename) {
        Some(caps) => match (caps[1].parse::<u32>(), caps.get(2)) {
            (Ok(i), Some(rest)) => (Some(i), rest.as_str()),
            _ => (None, filename),
        },
        None => (None, filename),
    };

    if is_dir {
        return Entry {
            index,
            name: rest.to_string(),
            extension: String::new(),
            is_dir,
            file_name: filename.to_string(),
        };
    }

    let (name, extension) = match rest.rfind('.') {
        Some(pos) if pos > 0 => rest.split_at(pos),
        _ => (rest, ""),
    };

    Entry {
        index,
        name: name.to_string(),
        extension: extension.to_string(),
        is_dir,
        file_name: filename.to_string(),
    }
}

/// Inverse of [parse].
#[inline]
pub fn format(entry: &Entry) -> String {
    entry.display_name()
}

/// Whether the scanner should model this directory item at all.
///
/// Hidden names (including the `.index` sidecar) are skipped. Files count only with the note
/// extension, directories always count.
pub fn is_managed(filename: &str, is_dir: bool) -> bool {
    if filename.starts_with('.') {
        return false;
    }
    is_dir
        || Path::new(filename)
            .extension()
            .is_some_and(|ext| ext == &NOTE_EXTENSION[1..])
}

/// Rewrites a legacy `"3 - Name"` filename to `"03. Name"`.
///
/// Returns `None` when the name does not use the legacy convention.
pub fn migrate_legacy_name(filename: &str) -> Option<String> {
    let caps = LEGACY_PREFIX_RE.captures(filename)?;
    let index = caps[1].parse::<u32>().ok()?;
    Some(format!("{:02}. {}", index, &caps[2]))
}
