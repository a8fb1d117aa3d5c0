use chrono::NaiveDateTime;
use log::debug;

use super::transaction::{RawTransaction, Transaction};

/// Column order of the cleaned table: the eight source columns followed by
/// the five derived ones.
pub const OUTPUT_COLUMNS: [&str; 13] = [
    super::COL_INVOICE_NO,
    super::COL_STOCK_CODE,
    super::COL_DESCRIPTION,
    super::COL_QUANTITY,
    super::COL_INVOICE_DATE,
    super::COL_UNIT_PRICE,
    super::COL_CUSTOMER_ID,
    super::COL_COUNTRY,
    "TotalPrice",
    "InvoiceYear",
    "InvoiceMonth",
    "DayOfWeek",
    "Hour",
];

/// The cleaned transaction table. Rows keep their source order but get a
/// fresh contiguous index; the original row numbers are gone.
#[derive(Default)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new() -> TransactionTable {
        TransactionTable { rows: Vec::new() }
    }

    /// Cleans every raw row, keeping survivors and logging the rest.
    /// `first_row_number` is the spreadsheet row number of the first raw row,
    /// used only for diagnostics.
    pub fn from_raw_rows<I>(raw_rows: I, first_row_number: usize) -> TransactionTable
    where
        I: IntoIterator<Item = RawTransaction>,
    {
        let mut table = TransactionTable::new();
        let mut dropped = 0usize;

        for (offset, raw) in raw_rows.into_iter().enumerate() {
            match raw.clean() {
                Ok(transaction) => table.rows.push(transaction),
                Err(reason) => {
                    dropped += 1;
                    debug!("dropping row {}, reason={}", first_row_number + offset, reason);
                },
            }
        }

        debug!("cleaned table has {} rows, dropped {}", table.rows.len(), dropped);

        table
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        OUTPUT_COLUMNS.len()
    }

    /// Min and max InvoiceDate over the table, `None` when empty.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.rows.iter().map(|tx| tx.invoice_date).min()?;
        let max = self.rows.iter().map(|tx| tx.invoice_date).max()?;

        Some((min, max))
    }
}
