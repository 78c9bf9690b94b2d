//! SQLite storage implementation for certificates.

mod model;
mod repository;

pub use model::CertificateDB;
pub use repository::CertificateRepository;
