//! Certificates module - issuance, public verification and revocation.

mod certificates_model;
mod certificates_service;
mod certificates_traits;
mod identifier;


pub use certificates_model::{
    Certificate, CertificateSnapshot, IssuedCertificate, VerificationResult,
};
pub use certificates_service::CertificateService;
pub use certificates_traits::{CertificateRepositoryTrait, CertificateServiceTrait};
pub use identifier::{
    compute_verification_hash, date_span, distinct_platforms, format_period,
    generate_certificate_id, normalize_certificate_id, CERTIFICATE_ID_PREFIX, MAX_ID_ATTEMPTS,
    VERIFICATION_HASH_LEN,
};
