//! Field extraction from raw earnings rows.
//!
//! Platform exports name their columns differently, so each field is looked
//! up against a short allow-list of header names. Extraction never rejects a
//! row: a missing or unreadable amount becomes zero and a missing or
//! unreadable date becomes `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::TransactionCandidate;
use crate::constants::MAX_TRANSACTION_AMOUNT;
use crate::platforms::Platform;

/// Header names that carry the earned amount. Matched exactly, in order.
pub const AMOUNT_COLUMNS: &[&str] = &[
    "amount",
    "Amount",
    "earnings",
    "Earnings",
    "Total Earnings",
    "total",
    "Total",
    "net_amount",
    "Net Amount",
    "payout",
    "Payout",
    "fare",
    "Fare",
];

/// Header names that carry the transaction date. Matched exactly, in order.
pub const DATE_COLUMNS: &[&str] = &[
    "date",
    "Date",
    "transaction_date",
    "Transaction Date",
    "order_date",
    "Order Date",
    "trip_date",
    "Trip Date",
    "created_at",
];

/// Header names that carry a trip or order reference. Matched exactly, in order.
pub const TRIP_ID_COLUMNS: &[&str] = &[
    "trip_id",
    "Trip ID",
    "order_id",
    "Order ID",
    "orderId",
    "tripId",
    "booking_id",
    "Booking ID",
];

const CURRENCY_TOKENS: &[&str] = &["INR", "Rs.", "Rs", "rs.", "rs", "₹", "$", "€", "£"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Builds a transaction candidate from one CSV row.
///
/// The full row is kept as the candidate's attribute bag.
pub fn extract_transaction(row: BTreeMap<String, String>, platform: Platform) -> TransactionCandidate {
    let amount = find_field(&row, AMOUNT_COLUMNS)
        .map(parse_amount)
        .unwrap_or(Decimal::ZERO);
    let transaction_date = find_field(&row, DATE_COLUMNS).and_then(parse_flexible_date);
    let trip_id = find_field(&row, TRIP_ID_COLUMNS).map(|v| v.trim().to_string());

    TransactionCandidate {
        platform,
        amount,
        transaction_date,
        trip_id,
        raw_data: row,
    }
}

/// Returns the first non-blank value among the candidate columns.
fn find_field<'a>(row: &'a BTreeMap<String, String>, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|column| row.get(*column))
        .map(String::as_str)
        .find(|value| !value.trim().is_empty())
}

/// Parses an amount such as `"₹12,500"`, `"Rs. 1,200.50"` or `"500/-"`.
///
/// Currency markers, thousands separators and whitespace are removed before
/// parsing. Anything still unparseable, or larger in magnitude than
/// [`MAX_TRANSACTION_AMOUNT`], yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let stripped = CURRENCY_TOKENS
        .iter()
        .fold(raw.trim().to_string(), |acc, token| acc.replace(token, ""));
    let cleaned: String = stripped
        .trim()
        .trim_end_matches("/-")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    match Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)) {
        Ok(amount) if amount.abs() > MAX_TRANSACTION_AMOUNT => {
            warn!("Implausible amount '{}' treated as zero", raw);
            Decimal::ZERO
        }
        Ok(amount) => amount,
        Err(e) => {
            debug!("Unreadable amount '{}' treated as zero: {}", raw, e);
            Decimal::ZERO
        }
    }
}

/// Parses a date in any of the common export formats.
///
/// Day-first numeric dates are preferred over month-first ones. Time
/// components are accepted and dropped.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}
