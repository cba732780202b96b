use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use lifelog_core::error::ReaderError;

/// Open a SQLite database strictly read-only.
///
/// The flag set refuses to create a missing file, so a bad path surfaces as
/// an open failure instead of an empty database.
pub(crate) fn open_read_only(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

/// Sort a rusqlite error into the reader taxonomy.
///
/// Container-level failures (cannot open, not a database, corruption) are
/// storage-access errors; missing tables or columns are schema errors; cell
/// values of an unexpected type are parse errors. `path` names the source
/// the caller is reading, which for an extracted backup is the archive
/// rather than the scratch file.
pub(crate) fn classify(path: &Path, err: rusqlite::Error) -> ReaderError {
    use rusqlite::ErrorCode;

    match &err {
        rusqlite::Error::SqliteFailure(code, message) => {
            let detail = message.clone().unwrap_or_else(|| code.to_string());
            match code.code {
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::PermissionDenied => ReaderError::storage_access(path, detail),
                _ if detail.contains("no such table") || detail.contains("no such column") => {
                    ReaderError::schema(path, detail)
                }
                _ => ReaderError::storage_access(path, detail),
            }
        }
        rusqlite::Error::InvalidColumnIndex(_) => ReaderError::schema(path, err.to_string()),
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            ReaderError::parse(path, err.to_string())
        }
        _ => ReaderError::storage_access(path, err.to_string()),
    }
}
