use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use rust_decimal::Decimal;
use thiserror::Error;

use super::{COL_COUNTRY, COL_INVOICE_DATE, COL_INVOICE_NO, COL_STOCK_CODE};

/// Why a raw row was excluded from the cleaned table. These are expected
/// during a normal run and only surface in debug logs.
#[derive(Debug, PartialEq, Error)]
pub enum DropReason {
    #[error("cancellation invoice")]
    Cancellation,
    #[error("non-positive quantity")]
    NonPositiveQuantity,
    #[error("non-positive unit price")]
    NonPositiveUnitPrice,
    #[error("missing {0}")]
    MissingField(&'static str),
}

/// One spreadsheet row exactly as read, before any cleaning. Every field is
/// optional because the source data has blanks in arbitrary places.
#[derive(Debug, Default)]
pub struct RawTransaction {
    pub invoice_no: Option<String>,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub invoice_date: Option<NaiveDateTime>,
    pub unit_price: Option<Decimal>,
    pub customer_id: Option<String>,
    pub country: Option<String>,
}

impl RawTransaction {
    /// Applies the cleaning filters: no cancellations (InvoiceNo starting
    /// with "C"), positive Quantity and UnitPrice, and no missing
    /// InvoiceNo/StockCode/InvoiceDate/Country. CustomerID and Description
    /// pass through unchecked.
    pub fn clean(self) -> Result<Transaction, DropReason> {
        if let Some(invoice_no) = &self.invoice_no {
            if invoice_no.starts_with('C') {
                return Err(DropReason::Cancellation);
            }
        }

        let quantity = match self.quantity {
            Some(quantity) if quantity > 0 => quantity,
            _ => return Err(DropReason::NonPositiveQuantity),
        };

        let unit_price = match self.unit_price {
            Some(unit_price) if unit_price > Decimal::ZERO => unit_price,
            _ => return Err(DropReason::NonPositiveUnitPrice),
        };

        let invoice_no = self
            .invoice_no
            .ok_or(DropReason::MissingField(COL_INVOICE_NO))?;
        let stock_code = self
            .stock_code
            .ok_or(DropReason::MissingField(COL_STOCK_CODE))?;
        let invoice_date = self
            .invoice_date
            .ok_or(DropReason::MissingField(COL_INVOICE_DATE))?;
        let country = self.country.ok_or(DropReason::MissingField(COL_COUNTRY))?;

        Ok(Transaction {
            invoice_no,
            stock_code,
            description: self.description,
            quantity,
            invoice_date,
            unit_price,
            customer_id: self.customer_id,
            country,
        })
    }
}

/// A transaction that survived cleaning. The derived columns are computed
/// on demand so the struct stores each fact exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub invoice_date: NaiveDateTime,
    pub unit_price: Decimal,
    pub customer_id: Option<String>,
    pub country: String,
}

impl Transaction {
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn invoice_year(&self) -> i32 {
        self.invoice_date.year()
    }

    /// First day of the invoice's month.
    pub fn invoice_month(&self) -> NaiveDate {
        let date = self.invoice_date.date();
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .unwrap_or(date)
    }

    pub fn day_of_week(&self) -> &'static str {
        match self.invoice_date.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn hour(&self) -> u32 {
        self.invoice_date.hour()
    }
}
