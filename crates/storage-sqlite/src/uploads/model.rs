//! Database models for uploads and transactions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use kamai_core::platforms::Platform;
use kamai_core::uploads::{NewTransaction, NewUploadedFile, Transaction, UploadedFile};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for uploaded files
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::uploaded_files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileDB {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub platform: String,
    pub row_count: i32,
    pub uploaded_at: NaiveDateTime,
}

/// Database model for transactions
#[derive(Queryable, Identifiable, Selectable, Associations, PartialEq, Debug, Clone)]
#[diesel(belongs_to(UploadedFileDB, foreign_key = upload_id))]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub upload_id: String,
    pub platform: String,
    pub amount: String,
    pub transaction_date: Option<String>,
    pub trip_id: Option<String>,
    pub raw_data: String,
    pub created_at: NaiveDateTime,
}

/// Database model for inserting a transaction
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewTransactionDB {
    pub id: String,
    pub user_id: String,
    pub upload_id: String,
    pub platform: String,
    pub amount: String,
    pub transaction_date: Option<String>,
    pub trip_id: Option<String>,
    pub raw_data: String,
    pub created_at: NaiveDateTime,
}

impl UploadedFileDB {
    pub fn from_new(new_upload: NewUploadedFile, id: String, uploaded_at: NaiveDateTime) -> Self {
        Self {
            id,
            user_id: new_upload.user_id,
            filename: new_upload.filename,
            platform: new_upload.platform.as_str().to_string(),
            row_count: i32::try_from(new_upload.row_count).unwrap_or(i32::MAX),
            uploaded_at,
        }
    }
}

impl NewTransactionDB {
    pub fn from_domain(
        domain: NewTransaction,
        id: String,
        created_at: NaiveDateTime,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            id,
            user_id: domain.user_id,
            upload_id: domain.upload_id,
            platform: domain.platform.as_str().to_string(),
            amount: domain.amount.to_string(),
            transaction_date: domain
                .transaction_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            trip_id: domain.trip_id,
            raw_data: serde_json::to_string(&domain.raw_data)?,
            created_at,
        })
    }
}

// Conversion to domain models
impl From<UploadedFileDB> for UploadedFile {
    fn from(db: UploadedFileDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            filename: db.filename,
            platform: Platform::from_name(&db.platform),
            row_count: usize::try_from(db.row_count).unwrap_or_default(),
            uploaded_at: db.uploaded_at,
        }
    }
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        let amount = Decimal::from_str(&db.amount).unwrap_or_else(|e| {
            log::error!(
                "Transaction {} has unreadable amount '{}': {}. Using zero.",
                db.id,
                db.amount,
                e
            );
            Decimal::ZERO
        });
        let transaction_date = db
            .transaction_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok());
        let raw_data: BTreeMap<String, String> =
            serde_json::from_str(&db.raw_data).unwrap_or_else(|e| {
                log::error!("Transaction {} has unreadable raw data: {}", db.id, e);
                BTreeMap::new()
            });

        Self {
            id: db.id,
            user_id: db.user_id,
            upload_id: db.upload_id,
            platform: Platform::from_name(&db.platform),
            amount,
            transaction_date,
            trip_id: db.trip_id,
            raw_data,
        }
    }
}
