pub mod table;
pub mod transaction;

#[cfg(test)]
mod transaction_tests;

pub const COL_INVOICE_NO: &str = "InvoiceNo";
pub const COL_STOCK_CODE: &str = "StockCode";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_INVOICE_DATE: &str = "InvoiceDate";
pub const COL_UNIT_PRICE: &str = "UnitPrice";
pub const COL_CUSTOMER_ID: &str = "CustomerID";
pub const COL_COUNTRY: &str = "Country";

/// Columns the source spreadsheet must provide. Description and CustomerID
/// may be empty per row, but the columns themselves have to exist.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_INVOICE_NO,
    COL_STOCK_CODE,
    COL_DESCRIPTION,
    COL_QUANTITY,
    COL_INVOICE_DATE,
    COL_UNIT_PRICE,
    COL_CUSTOMER_ID,
    COL_COUNTRY,
];
