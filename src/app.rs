//! Runs one [Command] against a [Garden] and collects what to print.
//!
//! Output is returned as lines instead of being printed, so the binary decides where it goes
//! and the commands can be tested against [crate::core::MemFs].

use crate::config::Config;
use crate::core::{FileSystem, Garden, ValidationResult};
use crate::error::Result;
use crate::utils::cli::Command;
use crate::utils::shorten_home_path;

use std::path::Path;

/// The printable result of a command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    lines: Vec<String>,
    success: bool,
}

impl Outcome {
    fn ok(lines: Vec<String>) -> Self {
        Outcome {
            lines,
            success: true,
        }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::ok(vec![line.into()])
    }

    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// False when the command ran but reported a problem (an invalid directory).
    #[inline]
    pub fn success(&self) -> bool {
        self.success
    }
}

pub fn run<F: FileSystem>(garden: &Garden<F>, command: &Command, config: &Config) -> Result<Outcome> {
    log::debug!("Running {:?} under {}", command, garden.root().display());

    let outcome = match command {
        Command::List { dir } => Outcome::ok(garden.load_directory(dir)?.list()),

        Command::Validate { dir } => {
            let loaded = garden.load_directory(dir)?;
            let result = garden.validate(&loaded);
            Outcome {
                lines: validation_report(dir, &result),
                success: result.is_valid(),
            }
        }

        Command::Index { dir } => {
            let mut loaded = garden.load_directory(dir)?;
            garden.apply_numeric_indexing(&mut loaded, config.general().dir_priority())?;
            Outcome::line(format!("Indexed {}", label(dir)))
        }

        Command::Unindex { dir } => {
            let mut loaded = garden.load_directory(dir)?;
            garden.remove_indexing(&mut loaded)?;
            Outcome::line(format!("Removed indexing from {}", label(dir)))
        }

        Command::Repair { dir } => {
            let mut loaded = garden.load_directory(dir)?;
            garden.repair(&mut loaded)?;
            Outcome::line(format!("Repaired {}", label(dir)))
        }

        Command::Up { dir, name } => {
            let mut loaded = garden.load_directory(dir)?;
            moved(garden.move_up(&mut loaded, name)?, name)
        }

        Command::Down { dir, name } => {
            let mut loaded = garden.load_directory(dir)?;
            moved(garden.move_down(&mut loaded, name)?, name)
        }

        Command::Move { dir, name, index } => {
            let mut loaded = garden.load_directory(dir)?;
            moved(garden.move_to(&mut loaded, name, *index)?, name)
        }

        Command::New { dir, name } => {
            let path = garden.create_note(dir, name.as_deref())?;
            Outcome::line(shorten_home_path(path))
        }

        Command::Mkdir { dir, name } => {
            let path = garden.create_directory(dir, name)?;
            Outcome::line(shorten_home_path(path))
        }

        Command::Rm { dir, name } => {
            let mut loaded = garden.load_directory(dir)?;
            if garden.delete(&mut loaded, name)? {
                Outcome::line(format!("Deleted {}", name))
            } else {
                Outcome::line(format!("{} is the anchor and was kept", name))
            }
        }

        Command::Migrate { dir } => {
            let report = garden.migrate(dir)?;
            Outcome::line(format!(
                "Migrated {}: {} renamed, {} skipped, {} index files rewritten",
                label(dir),
                report.renamed,
                report.skipped,
                report.markers
            ))
        }
    };
    Ok(outcome)
}

fn moved(changed: bool, name: &str) -> Outcome {
    if changed {
        Outcome::line(format!("Moved {}", name))
    } else {
        Outcome::line(format!("{} is already at the boundary", name))
    }
}

fn label(dir: &Path) -> String {
    if dir.as_os_str().is_empty() {
        "root".to_string()
    } else {
        dir.display().to_string()
    }
}

fn validation_report(dir: &Path, result: &ValidationResult) -> Vec<String> {
    if result.is_valid() {
        return vec![format!("{} is valid", label(dir))];
    }

    let mut lines = vec![format!("{} is invalid", label(dir))];
    lines.extend(result.issues().iter().map(|issue| format!("  {}", issue)));

    for (index, names) in result.duplicates() {
        lines.push(format!("  duplicate {:02}: {}", index, names.join(", ")));
    }
    if !result.missing_gaps().is_empty() {
        let gaps: Vec<String> = result
            .missing_gaps()
            .iter()
            .map(|i| format!("{:02}", i))
            .collect();
        lines.push(format!("  missing: {}", gaps.join(", ")));
    }
    for name in result.unindexed() {
        lines.push(format!("  unindexed: {}", name));
    }
    for name in result.misnamed() {
        lines.push(format!("  misnamed: {:?}", name));
    }
    lines.push("Run `gdn repair` to renumber.".to_string());
    lines
}
