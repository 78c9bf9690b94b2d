//! Kamai Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for turning gig platform earnings
//! exports into income metrics and verifiable income certificates.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod certificates;
pub mod constants;
pub mod errors;
pub mod metrics;
pub mod platforms;
pub mod session;
pub mod uploads;

pub use session::SessionContext;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
