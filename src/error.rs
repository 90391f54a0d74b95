//! Error type shared by every garden-index operation.
//!
//! Boundary-violating moves are not errors: they are reported as `Ok(false)` by the mutators.
//! Validation findings are data ([crate::core::ValidationResult]), not errors either.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// A read, write, rename or remove failed on `path`.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The `.index` sidecar exists but does not hold a valid record.
    #[error("malformed index config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The named entry is not part of the loaded directory snapshot.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// A rename or create would overwrite an existing filesystem object.
    #[error("target already exists: {}", .0.display())]
    Collision(PathBuf),

    /// The operation needs a numerically indexed directory.
    #[error("directory is not numerically indexed: {}", .0.display())]
    NotIndexed(PathBuf),

    /// A name that cannot become an entry: empty, hidden, or containing a path separator.
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),

    #[error("index {index} is out of range {min}..={max}")]
    OutOfRange { index: u32, min: u32, max: u32 },
}

impl IndexError {
    /// Wraps an [io::Error] with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attaches a path to a bare `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| IndexError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err: Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone")).at("notes/a.md");
        let msg = err.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("notes/a.md"), "got: {msg}");
        assert!(msg.contains("gone"), "got: {msg}");
    }

    #[test]
    fn out_of_range_message() {
        let err = IndexError::OutOfRange {
            index: 9,
            min: 1,
            max: 3,
        };
        assert_eq!(err.to_string(), "index 9 is out of range 1..=3");
    }
}
