use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the lifelog readers.
///
/// Every failure is attributed to one of four causes so callers can tell a
/// missing file apart from a present-but-unexpected one:
///
/// * [`ReaderError::StorageAccess`] – the source cannot be opened or read at
///   all, or is not a valid container of the expected kind.
/// * [`ReaderError::Schema`] – the container opened, but its internal layout
///   is not the export shape we know how to read.
/// * [`ReaderError::Parse`] – the layout is right, but an individual value
///   inside it is malformed.
/// * [`ReaderError::Archive`] – a backup archive is corrupt or lacks the
///   member we need.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// A file or directory is missing, unreadable, or not a valid container
    /// of the expected kind (bad SQLite magic, corrupt gzip stream, an
    /// unreadable workbook).
    #[error("Cannot read {path}: {detail}")]
    StorageAccess { path: PathBuf, detail: String },

    /// An expected table, column, or sheet is absent, a column count is off,
    /// or a row references an entity that does not exist.
    #[error("Unexpected schema in {path}: {detail}")]
    Schema { path: PathBuf, detail: String },

    /// An individual value inside a structurally sound container failed to
    /// parse (bad JSON line, unparseable duration cell, wrong cell type).
    #[error("Malformed data in {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    /// A backup archive is corrupt or does not contain the expected member.
    #[error("Archive error in {path}: {detail}")]
    Archive { path: PathBuf, detail: String },

    /// Pass-through for raw I/O errors that do not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    /// Build a [`ReaderError::StorageAccess`] from any displayable detail.
    pub fn storage_access(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::StorageAccess {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Build a [`ReaderError::Schema`] from any displayable detail.
    pub fn schema(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::Schema {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Build a [`ReaderError::Parse`] from any displayable detail.
    pub fn parse(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Build a [`ReaderError::Archive`] from any displayable detail.
    pub fn archive(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            detail: detail.to_string(),
        }
    }
}

/// Convenience alias used throughout the lifelog crates.
pub type Result<T> = std::result::Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_storage_access() {
        let err = ReaderError::storage_access("/home/u/habits.db", "no such file");
        let msg = err.to_string();
        assert!(msg.contains("Cannot read"));
        assert!(msg.contains("/home/u/habits.db"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_schema() {
        let err = ReaderError::schema("/home/u/habits.db", "no such table: Habits");
        assert_eq!(
            err.to_string(),
            "Unexpected schema in /home/u/habits.db: no such table: Habits"
        );
    }

    #[test]
    fn test_error_display_parse() {
        let err = ReaderError::parse("/logs/a.jsonl", "line 3: missing field `hostname`");
        assert_eq!(
            err.to_string(),
            "Malformed data in /logs/a.jsonl: line 3: missing field `hostname`"
        );
    }

    #[test]
    fn test_error_display_archive() {
        let err = ReaderError::archive("/backup.zip", "member usage_stats_event not found");
        assert_eq!(
            err.to_string(),
            "Archive error in /backup.zip: member usage_stats_event not found"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReaderError = io_err.into();
        let msg = err.to_string();
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_constructor_accepts_error_detail() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ReaderError::storage_access(PathBuf::from("/x"), io_err);
        assert!(err.to_string().contains("gone"));
    }
}
