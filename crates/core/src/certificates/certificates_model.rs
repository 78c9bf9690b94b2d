//! Certificate domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::platforms::Platform;

/// An income certificate issued to a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// `KAM-<year>-<NNNNN>`
    pub id: String,
    pub user_id: String,
    pub worker_name: String,
    /// Human readable range, e.g. "January 2024 - June 2024"
    pub period: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub total_net_income: Decimal,
    pub stability_score: u32,
    pub platforms: Vec<Platform>,
    pub verification_hash: String,
    pub is_active: bool,
    pub issued_at: NaiveDateTime,
}

impl Certificate {
    /// The id without its `KAM-` prefix, as used in public verification links.
    pub fn public_suffix(&self) -> &str {
        self.id
            .strip_prefix(super::identifier::CERTIFICATE_ID_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(&self.id)
    }
}

/// Result of issuing a certificate.
///
/// Storage failures do not fail issuance: the certificate is still returned
/// with `persisted = false` and a warning for the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCertificate {
    pub certificate: Certificate,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Publicly visible fields of a verified certificate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSnapshot {
    pub worker_name: String,
    pub period: String,
    pub total_net_income: Decimal,
    pub stability_score: u32,
    pub platforms: Vec<Platform>,
    pub verification_hash: String,
    pub issued_at: NaiveDateTime,
}

impl From<&Certificate> for CertificateSnapshot {
    fn from(certificate: &Certificate) -> Self {
        Self {
            worker_name: certificate.worker_name.clone(),
            period: certificate.period.clone(),
            total_net_income: certificate.total_net_income,
            stability_score: certificate.stability_score,
            platforms: certificate.platforms.clone(),
            verification_hash: certificate.verification_hash.clone(),
            issued_at: certificate.issued_at,
        }
    }
}

/// Answer to a public verification lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    /// The id that was looked up, normalized when possible
    pub certificate_id: String,
    /// Present only when `is_valid` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateSnapshot>,
    pub verified_at: NaiveDateTime,
}

impl VerificationResult {
    pub fn invalid(certificate_id: impl Into<String>, verified_at: NaiveDateTime) -> Self {
        Self {
            is_valid: false,
            certificate_id: certificate_id.into(),
            certificate: None,
            verified_at,
        }
    }
}
