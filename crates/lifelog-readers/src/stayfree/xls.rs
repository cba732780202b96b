//! Spreadsheet form of the screen-time export.
//!
//! One legacy `.xls` workbook, one sheet per measure, laid out wide: app
//! rows against date columns, closed off by a `Total Usage` trailer row.
//! The readers here melt that layout into the long-form records of
//! [`lifelog_core::models`].

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xls};
use chrono::{NaiveDate, TimeDelta};
use tracing::debug;

use lifelog_core::error::{ReaderError, Result};
use lifelog_core::models::{UnlockCountRecord, UsageCountRecord, UsageTimeRecord};
use lifelog_core::time_utils::parse_hms_duration;

/// Fixed sheet positions of the three measures.
const USAGE_TIME_SHEET: usize = 0;
const USAGE_COUNT_SHEET: usize = 1;
const UNLOCKS_SHEET: usize = 2;

/// Header literal of the app-name column.
const APP_HEADER: &str = "App";
/// Header literal of the optional device column.
const DEVICE_HEADER: &str = "Device";
/// App-column label of the totals row that terminates the data region.
const TOTALS_LABEL: &str = "Total Usage";
/// Format of the date headers, e.g. `"Nov 10, 2023"`.
const DATE_FORMAT: &str = "%b %d, %Y";

// ── Public API ────────────────────────────────────────────────────────────────

/// Read per-app daily screen time from a spreadsheet export.
///
/// One record per device, app and date column, in that nesting order, with
/// rows and columns kept in sheet order. Duration cells hold display
/// strings (`"1h 10m 26s"`); an empty cell is zero, anything else that does
/// not match the grammar is malformed. The totals trailer row and
/// everything below it never reach the output.
pub fn read_usage_time(path: &Path) -> Result<Vec<UsageTimeRecord>> {
    let range = load_sheet(path, USAGE_TIME_SHEET)?;
    usage_time_records(&range, path)
}

/// Read per-app daily open counts from a spreadsheet export.
///
/// Same layout and reshape as [`read_usage_time`], with plain integer
/// cells; an empty cell is zero.
pub fn read_usage_count(path: &Path) -> Result<Vec<UsageCountRecord>> {
    let range = load_sheet(path, USAGE_COUNT_SHEET)?;
    usage_count_records(&range, path)
}

/// Read the daily unlock counts from a spreadsheet export.
///
/// The unlock sheet is a single time series: date headers in the first row,
/// counts in the first data row, one record per date column. The leading
/// label cells of both rows are skipped, and any further rows belong to
/// other measures and are ignored.
pub fn read_device_unlocks(path: &Path) -> Result<Vec<UnlockCountRecord>> {
    let range = load_sheet(path, UNLOCKS_SHEET)?;
    unlock_records(&range, path)
}

// ── Workbook access ───────────────────────────────────────────────────────────

/// Open the workbook and pull one sheet by its fixed position.
fn load_sheet(path: &Path, index: usize) -> Result<Range<Data>> {
    let mut workbook: Xls<_> =
        open_workbook(path).map_err(|e| ReaderError::storage_access(path, e))?;
    match workbook.worksheet_range_at(index) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(ReaderError::storage_access(path, e)),
        None => Err(ReaderError::schema(
            path,
            format!("workbook has no sheet at index {index}"),
        )),
    }
}

// ── Sheet structure ───────────────────────────────────────────────────────────

/// Parsed header row of a usage sheet: where the device column sits, if
/// anywhere, and which date each remaining column carries.
struct SheetHeader {
    device_column: Option<usize>,
    /// `(column index, date)` pairs in sheet order.
    date_columns: Vec<(usize, NaiveDate)>,
}

/// One data row above the totals trailer.
struct DataRow<'r> {
    /// Device label, empty when the sheet has no device column.
    device: &'r str,
    app: &'r str,
    cells: &'r [Data],
}

fn parse_header(range: &Range<Data>, path: &Path) -> Result<SheetHeader> {
    let header = range
        .rows()
        .next()
        .ok_or_else(|| ReaderError::schema(path, "sheet is empty"))?;

    match header.first() {
        Some(Data::String(s)) if s == APP_HEADER => {}
        _ => {
            return Err(ReaderError::schema(
                path,
                format!("first header cell is not {APP_HEADER:?}"),
            ))
        }
    }

    let mut device_column = None;
    let mut date_columns = Vec::new();
    for (index, cell) in header.iter().enumerate().skip(1) {
        match cell {
            Data::String(s) if s == DEVICE_HEADER => device_column = Some(index),
            Data::String(s) => {
                let date = parse_date_header(s, path)?;
                date_columns.push((index, date));
            }
            Data::Empty => continue,
            other => {
                return Err(ReaderError::parse(
                    path,
                    format!("unexpected header cell: {other:?}"),
                ))
            }
        }
    }

    Ok(SheetHeader {
        device_column,
        date_columns,
    })
}

fn parse_date_header(text: &str, path: &Path) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| ReaderError::parse(path, format!("unparseable date header {text:?}")))
}

/// Collect the data rows strictly above the totals trailer.
///
/// The trailer row is part of the export's fixed shape; a sheet without it
/// has no defined end of data and is refused.
fn data_rows<'r>(
    range: &'r Range<Data>,
    header: &SheetHeader,
    path: &Path,
) -> Result<Vec<DataRow<'r>>> {
    let mut rows = Vec::new();
    for row in range.rows().skip(1) {
        let app = match row.first() {
            Some(Data::String(s)) => s.as_str(),
            other => {
                return Err(ReaderError::parse(
                    path,
                    format!("app cell is not text: {other:?}"),
                ))
            }
        };
        if app == TOTALS_LABEL {
            return Ok(rows);
        }

        let device = match header.device_column.map(|column| row.get(column)) {
            None => "",
            Some(Some(Data::String(s))) => s.as_str(),
            Some(Some(Data::Empty)) | Some(None) => "",
            Some(Some(other)) => {
                return Err(ReaderError::parse(
                    path,
                    format!("device cell is not text: {other:?}"),
                ))
            }
        };

        rows.push(DataRow {
            device,
            app,
            cells: row,
        });
    }

    Err(ReaderError::schema(
        path,
        format!("no {TOTALS_LABEL:?} row found"),
    ))
}

/// Group rows by device label, groups in first-appearance order, rows in
/// sheet order within each group.
fn device_groups(rows: Vec<DataRow<'_>>) -> Vec<(String, Vec<DataRow<'_>>)> {
    let mut groups: Vec<(String, Vec<DataRow>)> = Vec::new();
    for row in rows {
        match groups.iter().position(|(device, _)| device == row.device) {
            Some(index) => groups[index].1.push(row),
            None => groups.push((row.device.to_string(), vec![row])),
        }
    }
    groups
}

// ── Cell decoding ─────────────────────────────────────────────────────────────

fn cell_duration(
    cell: Option<&Data>,
    path: &Path,
    app: &str,
    date: NaiveDate,
) -> Result<TimeDelta> {
    match cell {
        Some(Data::String(s)) => parse_hms_duration(s).ok_or_else(|| {
            ReaderError::parse(path, format!("bad duration cell {s:?} for {app} on {date}"))
        }),
        Some(Data::Empty) | None => Ok(TimeDelta::zero()),
        Some(other) => Err(ReaderError::parse(
            path,
            format!("duration cell is not text: {other:?} for {app} on {date}"),
        )),
    }
}

/// BIFF numbers usually arrive as floats; counts must be whole either way.
fn cell_count(cell: Option<&Data>, path: &Path, label: &str, date: NaiveDate) -> Result<i64> {
    match cell {
        Some(Data::Int(n)) => Ok(*n),
        Some(Data::Float(f)) if f.fract() == 0.0 && (*f as i64) as f64 == *f => Ok(*f as i64),
        Some(Data::Empty) | None => Ok(0),
        Some(other) => Err(ReaderError::parse(
            path,
            format!("bad count cell {other:?} for {label} on {date}"),
        )),
    }
}

// ── Reshaping ─────────────────────────────────────────────────────────────────

fn usage_time_records(range: &Range<Data>, path: &Path) -> Result<Vec<UsageTimeRecord>> {
    let header = parse_header(range, path)?;
    let rows = data_rows(range, &header, path)?;

    let mut records = Vec::new();
    for (device, members) in device_groups(rows) {
        for row in &members {
            for &(column, date) in &header.date_columns {
                let duration = cell_duration(row.cells.get(column), path, row.app, date)?;
                records.push(UsageTimeRecord {
                    date,
                    app: row.app.to_string(),
                    duration,
                    device: device.clone(),
                });
            }
        }
    }

    debug!(
        "Usage-time sheet of {}: {} records",
        path.display(),
        records.len()
    );
    Ok(records)
}

fn usage_count_records(range: &Range<Data>, path: &Path) -> Result<Vec<UsageCountRecord>> {
    let header = parse_header(range, path)?;
    let rows = data_rows(range, &header, path)?;

    let mut records = Vec::new();
    for (device, members) in device_groups(rows) {
        for row in &members {
            for &(column, date) in &header.date_columns {
                let count = cell_count(row.cells.get(column), path, row.app, date)?;
                records.push(UsageCountRecord {
                    date,
                    app: row.app.to_string(),
                    count,
                    device: device.clone(),
                });
            }
        }
    }

    debug!(
        "Usage-count sheet of {}: {} records",
        path.display(),
        records.len()
    );
    Ok(records)
}

fn unlock_records(range: &Range<Data>, path: &Path) -> Result<Vec<UnlockCountRecord>> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ReaderError::schema(path, "unlock sheet is empty"))?;
    let counts = rows
        .next()
        .ok_or_else(|| ReaderError::schema(path, "unlock sheet has no data row"))?;

    let mut records = Vec::new();
    for (index, cell) in header.iter().enumerate().skip(1) {
        let date = match cell {
            Data::String(s) => parse_date_header(s, path)?,
            Data::Empty => continue,
            other => {
                return Err(ReaderError::parse(
                    path,
                    format!("unexpected header cell: {other:?}"),
                ))
            }
        };
        let count = cell_count(counts.get(index), path, "unlocks", date)?;
        records.push(UnlockCountRecord { date, count });
    }

    debug!(
        "Unlock sheet of {}: {} records",
        path.display(),
        records.len()
    );
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
