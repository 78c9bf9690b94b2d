use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use super::csv_parser::{parse_csv, ParseOptions};
use super::extractor::extract_transaction;
use super::uploads_model::{NewTransaction, NewUploadedFile, Transaction, UploadSummary, UploadedFile};
use super::uploads_traits::{UploadRepositoryTrait, UploadServiceTrait};
use crate::constants::TRANSACTION_BATCH_SIZE;
use crate::errors::{Error, Result, ValidationError};
use crate::platforms::detect_platform;
use crate::session::SessionContext;

/// Service for ingesting earnings files
pub struct UploadService {
    repository: Arc<dyn UploadRepositoryTrait>,
    batch_size: usize,
}

impl UploadService {
    pub fn new(repository: Arc<dyn UploadRepositoryTrait>) -> Self {
        Self {
            repository,
            batch_size: TRANSACTION_BATCH_SIZE,
        }
    }

    /// Overrides the number of transactions written per storage call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Loads an upload, treating uploads of other users as missing.
    fn get_owned_upload(&self, session: &SessionContext, upload_id: &str) -> Result<UploadedFile> {
        self.repository
            .get_upload(upload_id)?
            .filter(|upload| upload.user_id == session.user_id)
            .ok_or_else(|| Error::NotFound(format!("Upload {} not found", upload_id)))
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    let is_csv = Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::UnsupportedFileType(
            filename.to_string(),
        )))
    }
}

#[async_trait]
impl UploadServiceTrait for UploadService {
    async fn upload_csv(
        &self,
        session: &mut SessionContext,
        filename: &str,
        content: &[u8],
    ) -> Result<UploadSummary> {
        validate_filename(filename)?;
        let table = parse_csv(content, &ParseOptions::default())?;
        let platform = detect_platform(&table.headers);
        debug!(
            "Parsed '{}' for user {}: {} rows, platform {}",
            filename,
            session.user_id,
            table.row_count(),
            platform
        );

        let candidates: Vec<_> = (0..table.row_count())
            .filter_map(|idx| table.row_map(idx))
            .map(|row| extract_transaction(row, platform))
            .collect();

        let upload = self
            .repository
            .create_upload(NewUploadedFile {
                id: None,
                user_id: session.user_id.clone(),
                filename: filename.to_string(),
                platform,
                row_count: table.row_count(),
            })
            .await?;
        session.invalidate();

        let transactions: Vec<NewTransaction> = candidates
            .into_iter()
            .map(|candidate| NewTransaction::from_candidate(&session.user_id, &upload.id, candidate))
            .collect();

        // Batches are written one after another; a failure leaves earlier batches in place.
        let mut inserted = 0;
        for (batch_index, batch) in transactions.chunks(self.batch_size).enumerate() {
            match self.repository.insert_transactions(batch.to_vec()).await {
                Ok(count) => inserted += count,
                Err(e) => {
                    warn!(
                        "Upload {} aborted at batch {}: {} of {} transactions were stored and are kept. Error: {}",
                        upload.id,
                        batch_index + 1,
                        inserted,
                        transactions.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "Stored upload {} ('{}', {}) with {} transactions",
            upload.id, upload.filename, upload.platform, inserted
        );

        Ok(UploadSummary {
            upload,
            transactions_inserted: inserted,
            warnings: table.warnings.into_iter().map(|w| w.message).collect(),
        })
    }

    fn list_uploads(&self, session: &SessionContext) -> Result<Vec<UploadedFile>> {
        self.repository.list_uploads(&session.user_id)
    }

    fn get_upload_transactions(
        &self,
        session: &SessionContext,
        upload_id: &str,
    ) -> Result<Vec<Transaction>> {
        let upload = self.get_owned_upload(session, upload_id)?;
        self.repository.list_upload_transactions(&upload.id)
    }

    async fn delete_upload(&self, session: &mut SessionContext, upload_id: &str) -> Result<()> {
        let upload = self.get_owned_upload(session, upload_id)?;
        self.repository.delete_upload(&upload.id).await?;
        session.invalidate();
        info!("Deleted upload {} for user {}", upload.id, session.user_id);
        Ok(())
    }
}
