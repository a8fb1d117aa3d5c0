use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use super::transaction::{DropReason, RawTransaction};
use super::{COL_COUNTRY, COL_INVOICE_DATE, COL_INVOICE_NO, COL_STOCK_CODE};

fn date(y: i32, m: u32, d: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hour, min, 0).unwrap()
}

fn valid_raw() -> RawTransaction {
    RawTransaction {
        invoice_no: Some("536365".to_string()),
        stock_code: Some("85123A".to_string()),
        description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
        quantity: Some(6),
        invoice_date: Some(date(2010, 12, 1, 8, 26)),
        unit_price: Some(dec!(2.55)),
        customer_id: Some("17850".to_string()),
        country: Some("United Kingdom".to_string()),
    }
}

#[test]
fn test_clean_keeps_valid_row() -> Result<()> {
    let transaction = valid_raw().clean()?;

    assert_eq!(transaction.invoice_no, "536365");
    assert_eq!(transaction.quantity, 6);
    assert_eq!(transaction.unit_price, dec!(2.55));
    assert_eq!(transaction.total_price(), dec!(15.30));

    Ok(())
}

#[test]
fn test_clean_keeps_row_without_customer_or_description() -> Result<()> {
    let raw = RawTransaction {
        description: None,
        customer_id: None,
        ..valid_raw()
    };

    let transaction = raw.clean()?;
    assert_eq!(transaction.description, None);
    assert_eq!(transaction.customer_id, None);

    Ok(())
}

#[test]
fn test_clean_rejects_cancellation() -> Result<()> {
    let raw = RawTransaction {
        invoice_no: Some("C536379".to_string()),
        ..valid_raw()
    };

    if let Err(reason) = raw.clean() {
        assert_eq!(reason, DropReason::Cancellation);
    } else {
        bail!("invoices starting with C are cancellations and must be dropped");
    }

    Ok(())
}

#[test]
fn test_clean_rejects_non_positive_quantity() -> Result<()> {
    for quantity in [Some(0), Some(-2), None] {
        let raw = RawTransaction { quantity, ..valid_raw() };

        if let Err(reason) = raw.clean() {
            assert_eq!(reason, DropReason::NonPositiveQuantity);
        } else {
            bail!("quantity {:?} should be dropped", quantity);
        }
    }

    Ok(())
}

#[test]
fn test_clean_rejects_non_positive_unit_price() -> Result<()> {
    for unit_price in [Some(dec!(0)), Some(dec!(-1.25)), None] {
        let raw = RawTransaction { unit_price, ..valid_raw() };

        if let Err(reason) = raw.clean() {
            assert_eq!(reason, DropReason::NonPositiveUnitPrice);
        } else {
            bail!("unit price {:?} should be dropped", unit_price);
        }
    }

    Ok(())
}

#[test]
fn test_clean_rejects_missing_essential_fields() -> Result<()> {
    let cases = [
        (RawTransaction { invoice_no: None, ..valid_raw() }, COL_INVOICE_NO),
        (RawTransaction { stock_code: None, ..valid_raw() }, COL_STOCK_CODE),
        (RawTransaction { invoice_date: None, ..valid_raw() }, COL_INVOICE_DATE),
        (RawTransaction { country: None, ..valid_raw() }, COL_COUNTRY),
    ];

    for (raw, column) in cases {
        if let Err(reason) = raw.clean() {
            assert_eq!(reason, DropReason::MissingField(column));
        } else {
            bail!("row missing {} should be dropped", column);
        }
    }

    Ok(())
}

#[test]
fn test_derived_time_columns() -> Result<()> {
    let raw = RawTransaction {
        invoice_date: Some(date(2010, 12, 1, 8, 26)),
        ..valid_raw()
    };

    let transaction = raw.clean()?;
    assert_eq!(transaction.invoice_year(), 2010);
    assert_eq!(transaction.invoice_month(), NaiveDate::from_ymd_opt(2010, 12, 1).unwrap());
    assert_eq!(transaction.day_of_week(), "Wednesday");
    assert_eq!(transaction.hour(), 8);

    Ok(())
}

#[test]
fn test_invoice_month_is_first_of_month() -> Result<()> {
    let raw = RawTransaction {
        invoice_date: Some(date(2011, 7, 19, 23, 59)),
        ..valid_raw()
    };

    let transaction = raw.clean()?;
    assert_eq!(transaction.invoice_month(), NaiveDate::from_ymd_opt(2011, 7, 1).unwrap());
    assert_eq!(transaction.day_of_week(), "Tuesday");
    assert_eq!(transaction.hour(), 23);

    Ok(())
}

#[test]
fn test_total_price_is_exact_decimal() -> Result<()> {
    let raw = RawTransaction {
        quantity: Some(3),
        unit_price: Some(dec!(0.1)),
        ..valid_raw()
    };

    let transaction = raw.clean()?;
    assert_eq!(transaction.total_price(), dec!(0.3));

    Ok(())
}
