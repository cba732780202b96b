//! Reader for activity-log files.
//!
//! The logger appends one JSON event per line to files under
//! `~/.moonwatch-rs/log`, compressing rotated files to `.jsonl.gz`.
//! [`read_log`] loads a single file; [`read_log_directory`] walks a whole
//! directory of them, one file per iterator step.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use lifelog_core::error::{ReaderError, Result};
use lifelog_core::models::ActivityEvent;

// ── Public API ────────────────────────────────────────────────────────────────

/// Read one activity-log file, compressed or not.
///
/// A `.gz` extension selects transparent gzip decompression; anything else
/// is read as plain text, so the compressed and uncompressed form of the
/// same file yield identical event sequences. Events come back in line
/// order. The first malformed line aborts the read.
pub fn read_log(path: &Path) -> Result<Vec<ActivityEvent>> {
    let file = File::open(path).map_err(|e| ReaderError::storage_access(path, e))?;

    let compressed = path.extension().map(|ext| ext == "gz").unwrap_or(false);
    let events = if compressed {
        parse_lines(BufReader::new(GzDecoder::new(file)), path)?
    } else {
        parse_lines(BufReader::new(file), path)?
    };

    debug!("File {}: {} events", path.display(), events.len());
    Ok(events)
}

/// List the log files of a directory, non-recursively.
///
/// Rotated `.jsonl.gz` files come first, then live `.jsonl` files, each
/// group in whatever order the directory listing yields. Callers that need
/// a stable order sort the result themselves.
pub fn find_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut compressed = Vec::new();
    let mut plain = Vec::new();

    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ReaderError::storage_access(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".jsonl.gz") {
            compressed.push(entry.into_path());
        } else if name.ends_with(".jsonl") {
            plain.push(entry.into_path());
        }
    }

    let mut files = compressed;
    files.append(&mut plain);
    Ok(files)
}

/// Iterator over the event batches of a log directory, one batch per file.
///
/// Produced by [`read_log_directory`]. Each step reads one file on demand,
/// so a directory of rotated logs is never fully resident unless the caller
/// collects it.
pub struct LogDirectoryIter {
    files: std::vec::IntoIter<PathBuf>,
}

impl Iterator for LogDirectoryIter {
    type Item = Result<Vec<ActivityEvent>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.files.next().map(|path| read_log(&path))
    }
}

/// Read a directory of activity logs file by file.
///
/// Files come in [`find_log_files`] order. The listing happens up front, so
/// a missing or unlistable directory fails here rather than mid-iteration;
/// file contents are only read as the iterator advances.
pub fn read_log_directory(dir: &Path) -> Result<LogDirectoryIter> {
    let files = find_log_files(dir)?;
    debug!("Found {} log files in {}", files.len(), dir.display());
    Ok(LogDirectoryIter {
        files: files.into_iter(),
    })
}

/// Read a directory of activity logs into one flat event list.
///
/// Equivalent to chaining every batch of [`read_log_directory`]: file order
/// first, line order within each file, duplicates and overlapping spans
/// preserved exactly as written. The first failing file aborts the read.
pub fn read_log_directory_concat(dir: &Path) -> Result<Vec<ActivityEvent>> {
    let mut events = Vec::new();
    for batch in read_log_directory(dir)? {
        events.extend(batch?);
    }
    debug!(
        "Directory {}: {} events total",
        dir.display(),
        events.len()
    );
    Ok(events)
}

/// Default location the logger writes to: `~/.moonwatch-rs/log`.
///
/// `None` when no home directory can be determined.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".moonwatch-rs").join("log"))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Parse a stream of JSONL event lines, attributing failures to `path`.
///
/// Blank lines are tolerated; any other unparseable line is a hard error
/// naming its line number.
fn parse_lines<R: BufRead>(reader: R, path: &Path) -> Result<Vec<ActivityEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ReaderError::storage_access(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: ActivityEvent = serde_json::from_str(trimmed)
            .map_err(|e| ReaderError::parse(path, format!("line {}: {}", index + 1, e)))?;
        events.push(event);
    }
    Ok(events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
