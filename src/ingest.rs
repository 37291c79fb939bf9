//! Reading team spreadsheets into untyped tables.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{OrgChartError, Result};
use crate::models::{RawCell, RawTable, DATE_FORMAT};

const TEXT_DATE_FORMATS: [&str; 5] = [DATE_FORMAT, "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];
const TEXT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Reads the first worksheet of a workbook, or a CSV file, by extension.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" | "txt" => read_csv(path)?,
        _ => return Err(OrgChartError::UnsupportedFormat { extension }),
    };

    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read spreadsheet"
    );
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    let read_error = |message: String| OrgChartError::Read {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| read_error("workbook has no worksheets".to_string()))?
        .map_err(|e| read_error(e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(|cell| cell.to_string()).collect(),
        None => Vec::new(),
    };
    let mut table = RawTable {
        headers,
        ..RawTable::default()
    };
    for (index, cells) in rows.enumerate() {
        let cells: Vec<RawCell> = cells.iter().map(cell_from_sheet).collect();
        if cells.iter().any(|cell| *cell != RawCell::Empty) {
            table.rows.push(cells);
            table.row_numbers.push(index + 1);
        }
    }

    Ok(table)
}

fn cell_from_sheet(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            text_cell(value)
        }
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Float(value) => RawCell::Number(*value),
        Data::Bool(value) => RawCell::Bool(*value),
        Data::DateTime(value) => value
            .as_datetime()
            .map(RawCell::DateTime)
            .unwrap_or(RawCell::Number(value.as_f64())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let content = std::fs::read_to_string(path)?;
    parse_csv(content.trim_start_matches('\u{feff}')).map_err(|e| OrgChartError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parses CSV text, accepting `;` as the delimiter when the header line uses
/// it and has no commas.
pub fn parse_csv(content: &str) -> std::result::Result<RawTable, csv::Error> {
    let first_line = content.lines().next().unwrap_or_default();
    let delimiter = if first_line.contains(';') && !first_line.contains(',') {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header_record = reader.headers()?.clone();
    let header_line = header_record.position().map_or(1, |pos| pos.line());
    let mut table = RawTable {
        headers: header_record.iter().map(str::to_string).collect(),
        ..RawTable::default()
    };

    // The reader skips empty lines on its own; line positions keep warnings
    // pointing at the right row anyway.
    let mut records_seen = 0usize;
    for record in reader.records() {
        let record = record?;
        records_seen += 1;
        let cells: Vec<RawCell> = record.iter().map(text_cell).collect();
        if cells.iter().any(|cell| *cell != RawCell::Empty) {
            let number = record
                .position()
                .map_or(records_seen, |pos| pos.line().saturating_sub(header_line) as usize);
            table.rows.push(cells);
            table.row_numbers.push(number);
        }
    }

    Ok(table)
}

fn text_cell(value: &str) -> RawCell {
    if value.trim().is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(value.to_string())
    }
}

/// Calendar date of a date cell, or `None` when it is not recognizable.
pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::DateTime(value) => Some(value.date()),
        RawCell::Number(serial) => date_from_serial(*serial),
        RawCell::Text(value) => parse_date_text(value.trim()),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Parses a user-selected date in `dd/mm/yyyy` form.
pub fn parse_selected_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| OrgChartError::InvalidDate {
        value: value.to_string(),
    })
}
