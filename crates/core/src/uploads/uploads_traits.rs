//! Upload repository and service traits.
//!
//! These traits define the contract for upload operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::uploads_model::{NewTransaction, NewUploadedFile, Transaction, UploadSummary, UploadedFile};
use crate::errors::Result;
use crate::session::SessionContext;

/// Trait defining the contract for upload and transaction persistence.
#[async_trait]
pub trait UploadRepositoryTrait: Send + Sync {
    /// Records a new upload. The implementation assigns the id and timestamp.
    async fn create_upload(&self, new_upload: NewUploadedFile) -> Result<UploadedFile>;

    /// Inserts one batch of transactions in a single storage call.
    ///
    /// Returns the number of inserted rows.
    async fn insert_transactions(&self, batch: Vec<NewTransaction>) -> Result<usize>;

    /// Deletes an upload together with its transactions.
    ///
    /// Returns the number of deleted upload records.
    async fn delete_upload(&self, upload_id: &str) -> Result<usize>;

    fn get_upload(&self, upload_id: &str) -> Result<Option<UploadedFile>>;

    /// Lists a user's uploads, newest first.
    fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadedFile>>;

    /// Lists all of a user's transactions ordered by transaction date.
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    fn list_upload_transactions(&self, upload_id: &str) -> Result<Vec<Transaction>>;
}

/// Trait defining the contract for upload service operations.
#[async_trait]
pub trait UploadServiceTrait: Send + Sync {
    /// Parses an earnings CSV and stores it with its transactions.
    async fn upload_csv(
        &self,
        session: &mut SessionContext,
        filename: &str,
        content: &[u8],
    ) -> Result<UploadSummary>;

    fn list_uploads(&self, session: &SessionContext) -> Result<Vec<UploadedFile>>;

    /// Returns the transactions of one of the session user's uploads.
    fn get_upload_transactions(
        &self,
        session: &SessionContext,
        upload_id: &str,
    ) -> Result<Vec<Transaction>>;

    /// Deletes one of the session user's uploads and its transactions.
    async fn delete_upload(&self, session: &mut SessionContext, upload_id: &str) -> Result<()>;
}
