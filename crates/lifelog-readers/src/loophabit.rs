//! Reader for habit-tracker database exports.
//!
//! The tracker exports its state as a plain SQLite file. [`read_habits`]
//! returns the habit definition table as-is; [`read_repetitions`] returns
//! the per-day check-ins joined to their habit's display name.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use lifelog_core::error::{ReaderError, Result};
use lifelog_core::models::{Habit, RepetitionEntry};
use lifelog_core::time_utils::date_from_epoch_ms;

use crate::sqlite;

/// Column count of the habit table in every known export revision.
const HABIT_COLUMNS: usize = 18;

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the habit definition table from an exported tracker database.
///
/// Columns are read positionally in the export's fixed order, and rows come
/// back in storage order, never re-sorted. A habit table with any other
/// column count is an unknown schema revision and is refused.
pub fn read_habits(db_path: &Path) -> Result<Vec<Habit>> {
    let conn = sqlite::open_read_only(db_path).map_err(|e| sqlite::classify(db_path, e))?;
    let mut stmt = conn
        .prepare("SELECT * FROM Habits")
        .map_err(|e| sqlite::classify(db_path, e))?;

    let columns = stmt.column_count();
    if columns != HABIT_COLUMNS {
        return Err(ReaderError::schema(
            db_path,
            format!("Habits has {columns} columns, expected {HABIT_COLUMNS}"),
        ));
    }

    let rows = stmt
        .query_map([], |row| {
            Ok(Habit {
                id: row.get(0)?,
                archived: row.get(1)?,
                color: row.get(2)?,
                description: row.get(3)?,
                freq_den: row.get(4)?,
                freq_num: row.get(5)?,
                highlight: row.get(6)?,
                name: row.get(7)?,
                position: row.get(8)?,
                reminder_hour: row.get(9)?,
                reminder_min: row.get(10)?,
                reminder_days: row.get(11)?,
                kind: row.get(12)?,
                target_type: row.get(13)?,
                target_value: row.get(14)?,
                unit: row.get(15)?,
                question: row.get(16)?,
                uuid: row.get(17)?,
            })
        })
        .map_err(|e| sqlite::classify(db_path, e))?;

    let habits = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| sqlite::classify(db_path, e))?;

    debug!("Read {} habits from {}", habits.len(), db_path.display());
    Ok(habits)
}

/// Read every per-day check-in, joined to its habit's display name.
///
/// The habit table is read first and its `id → name` mapping is the only
/// source of names, so every entry's name is guaranteed to belong to the
/// same export. Entries follow in storage order; a check-in whose habit id
/// does not resolve is a schema violation of the export. Timestamps are
/// epoch milliseconds and floor to the calendar day they fall on.
pub fn read_repetitions(db_path: &Path) -> Result<Vec<RepetitionEntry>> {
    let conn = sqlite::open_read_only(db_path).map_err(|e| sqlite::classify(db_path, e))?;
    let names = habit_names(&conn, db_path)?;

    let mut stmt = conn
        .prepare("SELECT habit, timestamp, value, notes FROM Repetitions")
        .map_err(|e| sqlite::classify(db_path, e))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .map_err(|e| sqlite::classify(db_path, e))?;

    let mut entries = Vec::new();
    for row in rows {
        let (habit_id, timestamp_ms, value, notes) =
            row.map_err(|e| sqlite::classify(db_path, e))?;

        let name = names.get(&habit_id).ok_or_else(|| {
            ReaderError::schema(
                db_path,
                format!("repetition references unknown habit id {habit_id}"),
            )
        })?;
        let date = date_from_epoch_ms(timestamp_ms).ok_or_else(|| {
            ReaderError::parse(
                db_path,
                format!("repetition timestamp out of range: {timestamp_ms}"),
            )
        })?;

        entries.push(RepetitionEntry {
            name: name.clone(),
            date,
            value,
            notes: notes.unwrap_or_default(),
        });
    }

    debug!(
        "Read {} repetitions from {}",
        entries.len(),
        db_path.display()
    );
    Ok(entries)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// The `id → name` map of the export's habit table.
fn habit_names(conn: &Connection, db_path: &Path) -> Result<HashMap<i64, String>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM Habits")
        .map_err(|e| sqlite::classify(db_path, e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| sqlite::classify(db_path, e))?;
    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(|e| sqlite::classify(db_path, e))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use lifelog_core::models::EntryValue;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HABITS_DDL: &str = "CREATE TABLE Habits (
        id INTEGER PRIMARY KEY,
        archived INTEGER,
        color INTEGER,
        description TEXT,
        freq_den INTEGER,
        freq_num INTEGER,
        highlight INTEGER,
        name TEXT,
        position INTEGER,
        reminder_hour INTEGER,
        reminder_min INTEGER,
        reminder_days INTEGER,
        type INTEGER,
        target_type INTEGER,
        target_value REAL,
        unit TEXT,
        question TEXT,
        uuid TEXT
    )";

    const REPETITIONS_DDL: &str = "CREATE TABLE Repetitions (
        id INTEGER PRIMARY KEY,
        habit INTEGER,
        timestamp INTEGER,
        value INTEGER,
        notes TEXT
    )";

    fn midnight_ms(year: i32, month: u32, day: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    fn insert_habit(conn: &Connection, id: i64, name: &str, position: i64, uuid: &str) {
        conn.execute(
            "INSERT INTO Habits VALUES (?1, 0, 4, '', 1, 1, 0, ?2, ?3, NULL, NULL, 0, 0, 0, 0.0, '', '', ?4)",
            rusqlite::params![id, name, position, uuid],
        )
        .unwrap();
    }

    fn insert_repetition(conn: &Connection, habit: i64, timestamp: i64, value: i64) {
        conn.execute(
            "INSERT INTO Repetitions (habit, timestamp, value, notes) VALUES (?1, ?2, ?3, '')",
            rusqlite::params![habit, timestamp, value],
        )
        .unwrap();
    }

    /// Build the four-habit, ten-repetition export the tracker produces for
    /// its demo data.
    fn create_export(dir: &Path) -> PathBuf {
        let path = dir.join("habits.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(HABITS_DDL).unwrap();
        conn.execute_batch(REPETITIONS_DDL).unwrap();

        insert_habit(&conn, 1, "a", 1, "cwvnot6vdjvkwzu55s19gbgdeer84iz0");
        insert_habit(&conn, 2, "b", 2, "bvqw0ll0cbrb7yfwkm2mbvnkqxkesr6l");
        insert_habit(&conn, 3, "c", 3, "pmhcwkrt1oxtlx09wz9cqhsjg1qktdmq");
        insert_habit(&conn, 4, "d", 4, "v1ws9f3nqwecyuppaxiemaxwedezjcgr");

        insert_repetition(&conn, 1, midnight_ms(2014, 2, 21), 2);
        insert_repetition(&conn, 2, midnight_ms(2014, 2, 22), 2);
        insert_repetition(&conn, 3, midnight_ms(2014, 2, 23), 2);
        insert_repetition(&conn, 4, midnight_ms(2014, 2, 24), 2);
        insert_repetition(&conn, 1, midnight_ms(2014, 2, 25), 0);
        insert_repetition(&conn, 1, midnight_ms(2014, 2, 26), 2);
        insert_repetition(&conn, 1, midnight_ms(2014, 2, 27), 2);
        insert_repetition(&conn, 1, midnight_ms(2014, 2, 28), 2);
        insert_repetition(&conn, 1, midnight_ms(2014, 3, 1), 2);
        insert_repetition(&conn, 1, midnight_ms(2014, 3, 2), 2);

        path
    }

    // ── read_habits ───────────────────────────────────────────────────────────

    #[test]
    fn test_read_habits_returns_all_rows_in_storage_order() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let habits = read_habits(&db).unwrap();
        assert_eq!(habits.len(), 4);
        let names: Vec<&str> = habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_read_habits_first_row_field_by_field() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let habits = read_habits(&db).unwrap();
        assert_eq!(
            habits[0],
            Habit {
                id: 1,
                archived: 0,
                color: 4,
                description: String::new(),
                freq_den: 1,
                freq_num: 1,
                highlight: 0,
                name: "a".to_string(),
                position: 1,
                reminder_hour: None,
                reminder_min: None,
                reminder_days: 0,
                kind: 0,
                target_type: 0,
                target_value: 0.0,
                unit: String::new(),
                question: String::new(),
                uuid: "cwvnot6vdjvkwzu55s19gbgdeer84iz0".to_string(),
            }
        );
    }

    #[test]
    fn test_read_habits_missing_file_is_storage_access() {
        let dir = TempDir::new().unwrap();
        let err = read_habits(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, ReaderError::StorageAccess { .. }));
    }

    #[test]
    fn test_read_habits_non_database_is_storage_access() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.db");
        std::fs::write(&path, "not an sqlite file at all").unwrap();

        let err = read_habits(&path).unwrap_err();
        assert!(matches!(err, ReaderError::StorageAccess { .. }));
    }

    #[test]
    fn test_read_habits_missing_table_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE Unrelated (x INTEGER)")
            .unwrap();

        let err = read_habits(&path).unwrap_err();
        assert!(matches!(err, ReaderError::Schema { .. }));
    }

    #[test]
    fn test_read_habits_wrong_column_count_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE Habits (id INTEGER, name TEXT)")
            .unwrap();

        let err = read_habits(&path).unwrap_err();
        assert!(matches!(err, ReaderError::Schema { .. }));
        assert!(err.to_string().contains("expected 18"));
    }

    // ── read_repetitions ──────────────────────────────────────────────────────

    #[test]
    fn test_read_repetitions_preserves_every_row() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let entries = read_repetitions(&db).unwrap();
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn test_read_repetitions_first_and_last_rows() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let entries = read_repetitions(&db).unwrap();
        assert_eq!(
            entries[0],
            RepetitionEntry {
                name: "a".to_string(),
                date: NaiveDate::from_ymd_opt(2014, 2, 21).unwrap(),
                value: 2,
                notes: String::new(),
            }
        );
        assert_eq!(
            entries[9],
            RepetitionEntry {
                name: "a".to_string(),
                date: NaiveDate::from_ymd_opt(2014, 3, 2).unwrap(),
                value: 2,
                notes: String::new(),
            }
        );
    }

    #[test]
    fn test_read_repetitions_names_come_from_habit_table() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let habits = read_habits(&db).unwrap();
        let known: Vec<&str> = habits.iter().map(|h| h.name.as_str()).collect();

        let entries = read_repetitions(&db).unwrap();
        assert!(entries.iter().all(|e| known.contains(&e.name.as_str())));
    }

    #[test]
    fn test_read_repetitions_values_decode_for_yes_no_habits() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());

        let entries = read_repetitions(&db).unwrap();
        assert_eq!(EntryValue::from_code(entries[0].value), Some(EntryValue::YesManual));
        assert_eq!(EntryValue::from_code(entries[4].value), Some(EntryValue::No));
    }

    #[test]
    fn test_read_repetitions_orphan_habit_id_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());
        let conn = Connection::open(&db).unwrap();
        insert_repetition(&conn, 99, midnight_ms(2014, 3, 3), 2);
        drop(conn);

        let err = read_repetitions(&db).unwrap_err();
        assert!(matches!(err, ReaderError::Schema { .. }));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_read_repetitions_null_notes_become_empty() {
        let dir = TempDir::new().unwrap();
        let db = create_export(dir.path());
        let conn = Connection::open(&db).unwrap();
        conn.execute(
            "INSERT INTO Repetitions (habit, timestamp, value, notes) VALUES (1, ?1, 2, NULL)",
            rusqlite::params![midnight_ms(2014, 3, 3)],
        )
        .unwrap();
        drop(conn);

        let entries = read_repetitions(&db).unwrap();
        assert_eq!(entries.last().unwrap().notes, "");
    }
}
