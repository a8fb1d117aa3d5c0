use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::retail::table::{TransactionTable, OUTPUT_COLUMNS};
use crate::retail::transaction::{RawTransaction, Transaction};
use crate::retail::{
    COL_COUNTRY, COL_CUSTOMER_ID, COL_DESCRIPTION, COL_INVOICE_DATE, COL_INVOICE_NO, COL_QUANTITY,
    COL_STOCK_CODE, COL_UNIT_PRICE, REQUIRED_COLUMNS,
};

pub const DATA_PATH_ENV: &str = "DATA_PATH";
pub const DEFAULT_DATASET_FILE: &str = "Online Retail.xlsx";
pub const OUTPUTS_DIR: &str = "outputs";
pub const CLEANED_CSV_FILE: &str = "online_retail_cleaned.csv";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, PartialEq, Error)]
pub enum DatasetError {
    #[error("dataset not found or is empty, set DATA_PATH to the absolute path of Online Retail.xlsx")]
    NotFound,
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("dataset missing expected columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("row {row}: cannot parse {column} value {value:?}")]
    BadCell {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Locates the source spreadsheet: an existing `DATA_PATH` override wins,
/// otherwise the default file next to the working directory must exist and
/// be non-empty.
pub fn resolve_dataset_path(base_dir: &Path) -> Result<PathBuf, DatasetError> {
    resolve_with_override(env::var_os(DATA_PATH_ENV).map(PathBuf::from), base_dir)
}

/// The override path is only checked for existence, not size; the size
/// check applies to the default file alone.
pub(crate) fn resolve_with_override(
    explicit: Option<PathBuf>,
    base_dir: &Path,
) -> Result<PathBuf, DatasetError> {
    if let Some(path) = explicit {
        if !path.as_os_str().is_empty() && path.exists() {
            return Ok(path);
        }
    }

    let local = base_dir.join(DEFAULT_DATASET_FILE);
    match fs::metadata(&local) {
        Ok(meta) if meta.len() > 0 => Ok(local),
        _ => Err(DatasetError::NotFound),
    }
}

pub fn ensure_outputs_dir(base_dir: &Path) -> Result<PathBuf> {
    let outputs_dir = base_dir.join(OUTPUTS_DIR);
    fs::create_dir_all(&outputs_dir)?;

    Ok(outputs_dir)
}

/// Reads the first worksheet of the spreadsheet at `path` and returns the
/// cleaned transaction table.
pub fn load_and_clean(path: &Path) -> Result<TransactionTable> {
    info!("loading dataset from {}", path.display());

    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::NoWorksheet)??;

    Ok(table_from_sheet(&sheet)?)
}

/// Parses and cleans a worksheet whose first row is the header. Rows that
/// fail the cleaning filters are dropped; cells that cannot be parsed at
/// all abort the load.
pub fn table_from_sheet(sheet: &Range<Data>) -> Result<TransactionTable, DatasetError> {
    let mut rows = sheet.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Err(missing_columns(REQUIRED_COLUMNS.iter().copied())),
    };
    let columns = Columns::from_header(header)?;

    let mut raw_rows = Vec::with_capacity(sheet.height().saturating_sub(1));
    for (offset, cells) in rows.enumerate() {
        // Spreadsheet row numbers are 1-based and row 1 is the header.
        raw_rows.push(columns.raw_transaction(cells, offset + 2)?);
    }

    Ok(TransactionTable::from_raw_rows(raw_rows, 2))
}

fn missing_columns<'a, I>(names: I) -> DatasetError
where
    I: IntoIterator<Item = &'a str>,
{
    let mut missing: Vec<String> = names.into_iter().map(String::from).collect();
    missing.sort_unstable();

    DatasetError::MissingColumns(missing)
}

/// Header-name to cell-index mapping for one worksheet.
struct Columns {
    invoice_no: usize,
    stock_code: usize,
    description: usize,
    quantity: usize,
    invoice_date: usize,
    unit_price: usize,
    customer_id: usize,
    country: usize,
}

impl Columns {
    fn from_header(header: &[Data]) -> Result<Columns, DatasetError> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.get_string().map(|name| (name.trim(), index)))
            .collect();

        let absent: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !positions.contains_key(name))
            .collect();
        if !absent.is_empty() {
            return Err(missing_columns(absent));
        }

        Ok(Columns {
            invoice_no: positions[COL_INVOICE_NO],
            stock_code: positions[COL_STOCK_CODE],
            description: positions[COL_DESCRIPTION],
            quantity: positions[COL_QUANTITY],
            invoice_date: positions[COL_INVOICE_DATE],
            unit_price: positions[COL_UNIT_PRICE],
            customer_id: positions[COL_CUSTOMER_ID],
            country: positions[COL_COUNTRY],
        })
    }

    fn raw_transaction(&self, cells: &[Data], row: usize) -> Result<RawTransaction, DatasetError> {
        Ok(RawTransaction {
            invoice_no: string_cell(cells.get(self.invoice_no)),
            stock_code: string_cell(cells.get(self.stock_code)),
            description: string_cell(cells.get(self.description)),
            quantity: int_cell(cells.get(self.quantity), row, COL_QUANTITY)?,
            invoice_date: datetime_cell(cells.get(self.invoice_date), row, COL_INVOICE_DATE)?,
            unit_price: decimal_cell(cells.get(self.unit_price), row, COL_UNIT_PRICE)?,
            customer_id: string_cell(cells.get(self.customer_id)),
            country: string_cell(cells.get(self.country)),
        })
    }
}

/// Blank cells become `None`. Integer-valued numeric cells stringify without
/// a fractional suffix; the source stores invoice and customer numbers as
/// floats.
fn string_cell(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::Empty => None,
        Data::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        },
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) if value.fract() == 0.0 => Some(format!("{}", *value as i64)),
        other => other.as_string().filter(|text| !text.trim().is_empty()),
    }
}

fn int_cell(cell: Option<&Data>, row: usize, column: &'static str) -> Result<Option<i64>, DatasetError> {
    let cell = match cell {
        Some(cell) => cell,
        None => return Ok(None),
    };

    match cell {
        Data::Empty => Ok(None),
        Data::Int(value) => Ok(Some(*value)),
        Data::Float(value) if value.fract() == 0.0 => Ok(Some(*value as i64)),
        Data::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse().map(Some).map_err(|_| bad_cell(cell, row, column))
        },
        _ => Err(bad_cell(cell, row, column)),
    }
}

fn decimal_cell(cell: Option<&Data>, row: usize, column: &'static str) -> Result<Option<Decimal>, DatasetError> {
    let cell = match cell {
        Some(cell) => cell,
        None => return Ok(None),
    };

    match cell {
        Data::Empty => Ok(None),
        Data::Int(value) => Ok(Some(Decimal::from(*value))),
        Data::Float(value) => Decimal::try_from(*value)
            .map(Some)
            .map_err(|_| bad_cell(cell, row, column)),
        Data::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse().map(Some).map_err(|_| bad_cell(cell, row, column))
        },
        _ => Err(bad_cell(cell, row, column)),
    }
}

fn datetime_cell(
    cell: Option<&Data>,
    row: usize,
    column: &'static str,
) -> Result<Option<NaiveDateTime>, DatasetError> {
    let cell = match cell {
        Some(cell) => cell,
        None => return Ok(None),
    };

    match cell {
        Data::Empty => Ok(None),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(Some)
            .ok_or_else(|| bad_cell(cell, row, column)),
        Data::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_datetime_text(text)
                .map(Some)
                .ok_or_else(|| bad_cell(cell, row, column))
        },
        _ => Err(bad_cell(cell, row, column)),
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

fn bad_cell(cell: &Data, row: usize, column: &'static str) -> DatasetError {
    DatasetError::BadCell {
        row,
        column,
        value: cell.to_string(),
    }
}

/// One output row: the eight source columns plus the five derived ones, in
/// the order the CSV header must carry them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CleanedRecord {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub invoice_date: String,
    pub unit_price: Decimal,
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<String>,
    pub country: String,
    pub total_price: Decimal,
    pub invoice_year: i32,
    pub invoice_month: String,
    pub day_of_week: &'static str,
    pub hour: u32,
}

impl From<&Transaction> for CleanedRecord {
    fn from(transaction: &Transaction) -> Self {
        CleanedRecord {
            invoice_no: transaction.invoice_no.clone(),
            stock_code: transaction.stock_code.clone(),
            description: transaction.description.clone(),
            quantity: transaction.quantity,
            invoice_date: transaction.invoice_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            unit_price: transaction.unit_price,
            customer_id: transaction.customer_id.clone(),
            country: transaction.country.clone(),
            total_price: transaction.total_price(),
            invoice_year: transaction.invoice_year(),
            invoice_month: transaction.invoice_month().format("%Y-%m-%d").to_string(),
            day_of_week: transaction.day_of_week(),
            hour: transaction.hour(),
        }
    }
}

/// Writes the cleaned table as `online_retail_cleaned.csv` inside
/// `outputs_dir`, overwriting any previous run. No index column is written.
/// The header is written up front so an empty table still produces one.
pub fn export_csv(table: &TransactionTable, outputs_dir: &Path) -> Result<PathBuf> {
    let path = outputs_dir.join(CLEANED_CSV_FILE);
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_path(&path)?;

    csv_writer.write_record(OUTPUT_COLUMNS)?;
    for transaction in table.rows() {
        let record: CleanedRecord = transaction.into();
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;

    Ok(path)
}
