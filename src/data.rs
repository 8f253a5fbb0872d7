use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::report::pipeline::Summary;
use crate::report::table::{Record, Table};
use crate::report::{Columns, ReportConfig};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),
    #[error("column '{0}' not found in sheet header")]
    ColumnNotFound(String),
}

/// Maps the configured column roles to cell indices in the header row.
struct ColumnIndex {
    date: usize,
    amount: usize,
    main_category: usize,
    sub_category: usize,
    class: usize,
    source: usize,
}

impl ColumnIndex {
    fn from_header(header: &[Data], columns: &Columns) -> Result<ColumnIndex, LoadError> {
        let find = |name: &String| -> Result<usize, LoadError> {
            header
                .iter()
                .position(|cell| opt_text(cell).as_ref() == Some(name))
                .ok_or_else(|| LoadError::ColumnNotFound(name.clone()))
        };

        Ok(ColumnIndex {
            date: find(columns.date())?,
            amount: find(columns.amount())?,
            main_category: find(columns.main_category())?,
            sub_category: find(columns.sub_category())?,
            class: find(columns.class())?,
            source: find(columns.source())?,
        })
    }
}

/// Loads the configured sheet of the workbook at `path` into a table.
///
/// Only total failures are errors: missing file, unreadable workbook,
/// missing sheet, missing header column. A cell that merely fails to parse
/// degrades to the record-level sentinel instead (`None` date, zero amount).
pub fn load_sheet(path: &Path, cfg: &ReportConfig) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    if !workbook.sheet_names().contains(cfg.sheet_name()) {
        return Err(LoadError::SheetNotFound(cfg.sheet_name().clone()));
    }
    let range = workbook.worksheet_range(cfg.sheet_name())?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| LoadError::ColumnNotFound(cfg.columns().date().clone()))?;
    let index = ColumnIndex::from_header(header, cfg.columns())?;

    let mut table = Table::new();
    for (row_number, row) in rows.enumerate() {
        let cell = |idx: usize| row.get(idx).unwrap_or(&Data::Empty);

        let date = parse_date(cell(index.date));
        if date.is_none() && *cell(index.date) != Data::Empty {
            debug!("row {}: unparseable date '{}'", row_number + 2, cell(index.date));
        }

        table.push(Record {
            date,
            amount: parse_amount(cell(index.amount)).unwrap_or(Decimal::ZERO),
            main_category: opt_text(cell(index.main_category)).unwrap_or_default(),
            sub_category: opt_text(cell(index.sub_category)),
            class: opt_text(cell(index.class)),
            source: opt_text(cell(index.source)),
        });
    }

    Ok(table)
}

fn parse_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_str(s),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }

    None
}

fn parse_amount(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => Decimal::from_f64(*f),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Textual cell content; empty and whitespace-only cells become `None`.
fn opt_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        other => Some(other.to_string()),
    }
}

/// Writes a summary as a CSV file: one header row, then the aggregate rows
/// in their sorted order, absent keys as empty fields.
///
/// The whole file is serialized in memory first, so a failure part-way
/// through never leaves a truncated file behind.
pub fn export_summary(summary: &Summary, path: &Path) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let [first, second] = summary.key_columns();
    csv_writer.write_record([first, second, summary.amount_column()])?;

    for row in summary.rows() {
        let amount = row.amount.to_string();
        csv_writer.write_record([
            row.keys[0].as_deref().unwrap_or(""),
            row.keys[1].as_deref().unwrap_or(""),
            amount.as_str(),
        ])?;
    }

    let buffer = csv_writer.into_inner()?;
    fs::write(path, buffer)?;

    Ok(())
}
