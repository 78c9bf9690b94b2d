use async_trait::async_trait;

use super::certificates_model::{Certificate, IssuedCertificate, VerificationResult};
use crate::errors::Result;
use crate::session::SessionContext;

/// Trait defining the contract for certificate persistence.
#[async_trait]
pub trait CertificateRepositoryTrait: Send + Sync {
    /// Stores a fully built certificate. Fails on a duplicate id.
    async fn insert_certificate(&self, certificate: Certificate) -> Result<Certificate>;

    /// Flips the active flag. Returns the number of updated records.
    async fn set_certificate_active(&self, certificate_id: &str, is_active: bool) -> Result<usize>;

    fn get_certificate(&self, certificate_id: &str) -> Result<Option<Certificate>>;

    fn certificate_exists(&self, certificate_id: &str) -> Result<bool>;

    /// Lists a user's certificates, newest first.
    fn list_certificates(&self, user_id: &str) -> Result<Vec<Certificate>>;
}

/// Trait defining the contract for certificate service operations.
#[async_trait]
pub trait CertificateServiceTrait: Send + Sync {
    /// Issues a certificate from the session's metrics snapshot.
    async fn issue_certificate(&self, session: &mut SessionContext) -> Result<IssuedCertificate>;

    /// Public lookup of a certificate by id or id suffix.
    fn verify_certificate(&self, id_fragment: &str) -> Result<VerificationResult>;

    fn list_certificates(&self, session: &SessionContext) -> Result<Vec<Certificate>>;

    /// Marks one of the session user's certificates as no longer valid.
    async fn revoke_certificate(
        &self,
        session: &mut SessionContext,
        certificate_id: &str,
    ) -> Result<Certificate>;
}
