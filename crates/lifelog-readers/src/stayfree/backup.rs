//! Backup form of the screen-time export.
//!
//! A full backup is a zip archive wrapping, among other things, a SQLite
//! database of daily usage counters. Only the usage-time measure exists in
//! this form, but at millisecond precision and with optional resolution of
//! package identifiers to display names.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use tracing::debug;
use zip::ZipArchive;

use lifelog_core::error::{ReaderError, Result};
use lifelog_core::models::UsageTimeRecord;
use lifelog_core::time_utils::date_from_epoch_ms;

use crate::sqlite;

/// Name of the SQLite member inside the backup archive.
const USAGE_DB_MEMBER: &str = "usage_stats_event";

/// Daily usage totals, identifiers only.
const USAGE_QUERY: &str =
    "SELECT TIMESTAMP, PACKAGE_NAME, TOTAL_USAGE_TIME FROM DailyUsageStatsEntity";

/// Daily usage totals left-joined to display names, so packages the backup
/// cannot resolve still come through.
const USAGE_QUERY_RESOLVED: &str = "\
    SELECT D.TIMESTAMP, D.PACKAGE_NAME, D.TOTAL_USAGE_TIME, A.APP_NAME \
    FROM DailyUsageStatsEntity D \
    LEFT JOIN AppInfoEntity A ON D.PACKAGE_NAME = A.PACKAGE_NAME";

// ── Public API ────────────────────────────────────────────────────────────────

/// Read per-app daily screen time out of a full backup archive.
///
/// The `usage_stats_event` member is extracted into a temporary directory
/// (removed again on every path out of this function) and queried
/// read-only. Timestamps floor to the day they fall on; usage counters are
/// milliseconds and stay millisecond-precise. The device label is always
/// empty, the backup has no device dimension.
///
/// With `resolve_app_names` set, package identifiers are swapped for the
/// display names the backup carries, falling back to the raw identifier for
/// packages it cannot resolve. When unset the identifiers are returned
/// as-is and the name table is never touched, which keeps old backups
/// without one readable.
pub fn read_usage_time_from_backup(
    path: &Path,
    resolve_app_names: bool,
) -> Result<Vec<UsageTimeRecord>> {
    let scratch = tempfile::tempdir()?;
    let db_path = extract_usage_db(path, scratch.path())?;

    let conn = sqlite::open_read_only(&db_path).map_err(|e| sqlite::classify(path, e))?;
    let query = if resolve_app_names {
        USAGE_QUERY_RESOLVED
    } else {
        USAGE_QUERY
    };
    let mut stmt = conn.prepare(query).map_err(|e| sqlite::classify(path, e))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                if resolve_app_names {
                    row.get::<_, Option<String>>(3)?
                } else {
                    None
                },
            ))
        })
        .map_err(|e| sqlite::classify(path, e))?;

    let mut records = Vec::new();
    for row in rows {
        let (timestamp_ms, package, usage_ms, app_name) =
            row.map_err(|e| sqlite::classify(path, e))?;

        let date = date_from_epoch_ms(timestamp_ms).ok_or_else(|| {
            ReaderError::parse(path, format!("usage timestamp out of range: {timestamp_ms}"))
        })?;
        let app = match app_name {
            Some(name) => name,
            None => package,
        };

        let duration = TimeDelta::try_milliseconds(usage_ms).ok_or_else(|| {
            ReaderError::parse(path, format!("usage duration out of range: {usage_ms}"))
        })?;

        records.push(UsageTimeRecord {
            date,
            app,
            duration,
            device: String::new(),
        });
    }

    debug!("Backup {}: {} usage records", path.display(), records.len());
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Pull the usage database out of the archive into `scratch`.
fn extract_usage_db(archive_path: &Path, scratch: &Path) -> Result<PathBuf> {
    let file = File::open(archive_path).map_err(|e| ReaderError::storage_access(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ReaderError::archive(archive_path, e))?;
    let mut member = archive.by_name(USAGE_DB_MEMBER).map_err(|e| {
        ReaderError::archive(archive_path, format!("member {USAGE_DB_MEMBER:?}: {e}"))
    })?;

    let db_path = scratch.join(USAGE_DB_MEMBER);
    let mut out = File::create(&db_path)?;
    io::copy(&mut member, &mut out)?;
    Ok(db_path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
