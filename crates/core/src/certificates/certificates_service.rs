use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use super::certificates_model::{
    Certificate, CertificateSnapshot, IssuedCertificate, VerificationResult,
};
use super::certificates_traits::{CertificateRepositoryTrait, CertificateServiceTrait};
use super::identifier::{
    compute_verification_hash, date_span, distinct_platforms, format_period,
    generate_certificate_id, id_year, normalize_certificate_id, MAX_ID_ATTEMPTS,
};
use crate::errors::{Error, Prerequisite, Result};
use crate::metrics::IncomeMetrics;
use crate::session::SessionContext;
use crate::uploads::UploadRepositoryTrait;

/// Service for issuing, verifying and revoking income certificates.
pub struct CertificateService {
    certificate_repository: Arc<dyn CertificateRepositoryTrait>,
    upload_repository: Arc<dyn UploadRepositoryTrait>,
}

impl CertificateService {
    pub fn new(
        certificate_repository: Arc<dyn CertificateRepositoryTrait>,
        upload_repository: Arc<dyn UploadRepositoryTrait>,
    ) -> Self {
        Self {
            certificate_repository,
            upload_repository,
        }
    }

    /// Draws ids until one is not taken.
    ///
    /// If the existence check itself fails the drawn id is used as is and the
    /// primary key decides on insert.
    fn allocate_certificate_id(&self, year: i32) -> Result<String> {
        let mut rng = rand::thread_rng();
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = generate_certificate_id(&mut rng, year);
            match self.certificate_repository.certificate_exists(&id) {
                Ok(false) => return Ok(id),
                Ok(true) => debug!("Certificate id {} taken (attempt {})", id, attempt),
                Err(e) => {
                    warn!("Could not check certificate id {}: {}", id, e);
                    return Ok(id);
                }
            }
        }
        Err(Error::ConstraintViolation(format!(
            "Could not allocate a free certificate id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    async fn persist(&self, certificate: Certificate) -> IssuedCertificate {
        match self
            .certificate_repository
            .insert_certificate(certificate.clone())
            .await
        {
            Ok(stored) => {
                info!(
                    "Issued certificate {} for user {}",
                    stored.id, stored.user_id
                );
                IssuedCertificate {
                    certificate: stored,
                    persisted: true,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(
                    "Certificate {} issued but could not be saved: {}",
                    certificate.id, e
                );
                IssuedCertificate {
                    certificate,
                    persisted: false,
                    warning: Some(format!(
                        "The certificate was generated but could not be saved, so it cannot be verified yet: {}",
                        e
                    )),
                }
            }
        }
    }
}

fn matches_snapshot(
    certificate: &Certificate,
    metrics: &IncomeMetrics,
    session: &SessionContext,
) -> bool {
    certificate.user_id == session.user_id
        && certificate.worker_name == session.worker_name
        && certificate.is_active
        && certificate.total_net_income == metrics.total_net_income
        && certificate.stability_score == metrics.stability_score
}

#[async_trait]
impl CertificateServiceTrait for CertificateService {
    async fn issue_certificate(&self, session: &mut SessionContext) -> Result<IssuedCertificate> {
        let metrics = session
            .metrics()
            .cloned()
            .ok_or(Error::PrerequisiteMissing(Prerequisite::Metrics))?;

        if let Some(cached) = session.certificate().cloned() {
            if matches_snapshot(&cached, &metrics, session) {
                let stored = self
                    .certificate_repository
                    .certificate_exists(&cached.id)
                    .unwrap_or(false);
                if stored {
                    debug!("Returning certificate {} already issued this session", cached.id);
                    return Ok(IssuedCertificate {
                        certificate: cached,
                        persisted: true,
                        warning: None,
                    });
                }
                // Same certificate, earlier save failed
                return Ok(self.persist(cached).await);
            }
        }

        let transactions = self.upload_repository.list_transactions(&session.user_id)?;
        let issued_at = Utc::now().trunc_subsecs(0).naive_utc();
        let id = self.allocate_certificate_id(id_year(&issued_at))?;
        let span = date_span(&transactions);

        let certificate = Certificate {
            verification_hash: compute_verification_hash(
                &id,
                &session.user_id,
                metrics.total_net_income,
                metrics.stability_score,
                &issued_at,
            ),
            id,
            user_id: session.user_id.clone(),
            worker_name: session.worker_name.clone(),
            period: format_period(span, issued_at.date()),
            period_start: span.map(|(start, _)| start),
            period_end: span.map(|(_, end)| end),
            total_net_income: metrics.total_net_income,
            stability_score: metrics.stability_score,
            platforms: distinct_platforms(&transactions),
            is_active: true,
            issued_at,
        };

        let issued = self.persist(certificate).await;
        session.set_certificate(issued.certificate.clone());
        Ok(issued)
    }

    fn verify_certificate(&self, id_fragment: &str) -> Result<VerificationResult> {
        let verified_at = Utc::now().naive_utc();
        let Some(certificate_id) = normalize_certificate_id(id_fragment) else {
            debug!("Rejected malformed certificate id '{}'", id_fragment);
            return Ok(VerificationResult::invalid(id_fragment.trim(), verified_at));
        };

        let Some(certificate) = self.certificate_repository.get_certificate(&certificate_id)?
        else {
            return Ok(VerificationResult::invalid(certificate_id, verified_at));
        };

        if !certificate.is_active {
            debug!("Certificate {} has been revoked", certificate_id);
            return Ok(VerificationResult::invalid(certificate_id, verified_at));
        }

        let expected = compute_verification_hash(
            &certificate.id,
            &certificate.user_id,
            certificate.total_net_income,
            certificate.stability_score,
            &certificate.issued_at,
        );
        if expected != certificate.verification_hash {
            warn!(
                "Certificate {} failed its hash check (stored {}, expected {})",
                certificate_id, certificate.verification_hash, expected
            );
            return Ok(VerificationResult::invalid(certificate_id, verified_at));
        }

        Ok(VerificationResult {
            is_valid: true,
            certificate_id,
            certificate: Some(CertificateSnapshot::from(&certificate)),
            verified_at,
        })
    }

    fn list_certificates(&self, session: &SessionContext) -> Result<Vec<Certificate>> {
        self.certificate_repository
            .list_certificates(&session.user_id)
    }

    async fn revoke_certificate(
        &self,
        session: &mut SessionContext,
        certificate_id: &str,
    ) -> Result<Certificate> {
        let not_found = || Error::NotFound(format!("Certificate {} not found", certificate_id));
        let id = normalize_certificate_id(certificate_id).ok_or_else(not_found)?;
        let mut certificate = self
            .certificate_repository
            .get_certificate(&id)?
            .filter(|c| c.user_id == session.user_id)
            .ok_or_else(not_found)?;

        if certificate.is_active {
            self.certificate_repository
                .set_certificate_active(&id, false)
                .await?;
            certificate.is_active = false;
            info!("Revoked certificate {} for user {}", id, session.user_id);
        }

        if session.certificate().is_some_and(|c| c.id == id) {
            session.clear_certificate();
        }
        Ok(certificate)
    }
}
