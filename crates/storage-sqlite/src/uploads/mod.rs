//! SQLite storage implementation for uploads and their transactions.

mod model;
mod repository;

pub(crate) use model::DATE_FORMAT;
pub use model::{NewTransactionDB, TransactionDB, UploadedFileDB};
pub use repository::UploadRepository;
