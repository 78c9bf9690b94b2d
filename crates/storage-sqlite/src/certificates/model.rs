//! Database models for certificates.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use kamai_core::certificates::Certificate;
use kamai_core::platforms::Platform;

use crate::errors::StorageError;
use crate::uploads::DATE_FORMAT;

/// Database model for certificates
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::certificates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
pub struct CertificateDB {
    pub id: String,
    pub user_id: String,
    pub worker_name: String,
    pub period: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub total_net_income: String,
    pub stability_score: i32,
    /// JSON array of platform names
    pub platforms: String,
    pub verification_hash: String,
    pub is_active: bool,
    pub issued_at: NaiveDateTime,
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok())
}

impl TryFrom<Certificate> for CertificateDB {
    type Error = StorageError;

    fn try_from(domain: Certificate) -> Result<Self, Self::Error> {
        let platforms: Vec<&str> = domain.platforms.iter().map(Platform::as_str).collect();
        Ok(Self {
            platforms: serde_json::to_string(&platforms)?,
            period_start: format_date(domain.period_start),
            period_end: format_date(domain.period_end),
            total_net_income: domain.total_net_income.to_string(),
            stability_score: i32::try_from(domain.stability_score).map_err(|_| {
                StorageError::CorruptValue(format!(
                    "stability score {} out of range",
                    domain.stability_score
                ))
            })?,
            id: domain.id,
            user_id: domain.user_id,
            worker_name: domain.worker_name,
            period: domain.period,
            verification_hash: domain.verification_hash,
            is_active: domain.is_active,
            issued_at: domain.issued_at,
        })
    }
}

// Certificates feed verification, so unreadable columns are errors rather
// than silently defaulted.
impl TryFrom<CertificateDB> for Certificate {
    type Error = StorageError;

    fn try_from(db: CertificateDB) -> Result<Self, Self::Error> {
        let total_net_income = Decimal::from_str(&db.total_net_income).map_err(|e| {
            StorageError::CorruptValue(format!(
                "certificate {} total '{}': {}",
                db.id, db.total_net_income, e
            ))
        })?;
        let stability_score = u32::try_from(db.stability_score).map_err(|_| {
            StorageError::CorruptValue(format!(
                "certificate {} score {}",
                db.id, db.stability_score
            ))
        })?;
        let platform_names: Vec<String> = serde_json::from_str(&db.platforms)?;

        Ok(Self {
            period_start: parse_date(db.period_start.as_deref()),
            period_end: parse_date(db.period_end.as_deref()),
            platforms: platform_names
                .iter()
                .map(|name| Platform::from_name(name))
                .collect(),
            total_net_income,
            stability_score,
            id: db.id,
            user_id: db.user_id,
            worker_name: db.worker_name,
            period: db.period,
            verification_hash: db.verification_hash,
            is_active: db.is_active,
            issued_at: db.issued_at,
        })
    }
}
