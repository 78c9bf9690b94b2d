//! Uploads module - CSV ingestion, field extraction and persistence contracts.

mod csv_parser;
mod extractor;
mod uploads_model;
mod uploads_service;
mod uploads_traits;

#[cfg(test)]
mod uploads_service_tests;

pub use csv_parser::{parse_csv, CsvTable, CsvWarning, ParseOptions};
pub use extractor::{
    extract_transaction, parse_amount, parse_flexible_date, AMOUNT_COLUMNS, DATE_COLUMNS,
    TRIP_ID_COLUMNS,
};
pub use uploads_model::{
    NewTransaction, NewUploadedFile, Transaction, TransactionCandidate, UploadSummary,
    UploadedFile,
};
pub use uploads_service::UploadService;
pub use uploads_traits::{UploadRepositoryTrait, UploadServiceTrait};
