//! Upload and transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::platforms::Platform;

/// An earnings file uploaded by a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub platform: Platform,
    pub row_count: usize,
    pub uploaded_at: NaiveDateTime,
}

/// Input model for recording a new upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUploadedFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub filename: String,
    pub platform: Platform,
    pub row_count: usize,
}

/// A single earnings row belonging to an upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub upload_id: String,
    pub platform: Platform,
    /// Gross amount as reported by the platform
    pub amount: Decimal,
    pub transaction_date: Option<NaiveDate>,
    pub trip_id: Option<String>,
    /// The original CSV row, column name to raw value
    pub raw_data: BTreeMap<String, String>,
}

/// Normalized fields pulled out of one CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub platform: Platform,
    pub amount: Decimal,
    pub transaction_date: Option<NaiveDate>,
    pub trip_id: Option<String>,
    pub raw_data: BTreeMap<String, String>,
}

/// Input model for inserting a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub upload_id: String,
    pub platform: Platform,
    pub amount: Decimal,
    pub transaction_date: Option<NaiveDate>,
    pub trip_id: Option<String>,
    pub raw_data: BTreeMap<String, String>,
}

impl NewTransaction {
    pub fn from_candidate(user_id: &str, upload_id: &str, candidate: TransactionCandidate) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            upload_id: upload_id.to_string(),
            platform: candidate.platform,
            amount: candidate.amount,
            transaction_date: candidate.transaction_date,
            trip_id: candidate.trip_id,
            raw_data: candidate.raw_data,
        }
    }
}

/// Outcome of a CSV upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub upload: UploadedFile,
    pub transactions_inserted: usize,
    /// Non-fatal parse warnings, e.g. ragged rows or bad encoding
    pub warnings: Vec<String>,
}
