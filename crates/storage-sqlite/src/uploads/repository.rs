use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use kamai_core::uploads::{
    NewTransaction, NewUploadedFile, Transaction, UploadRepositoryTrait, UploadedFile,
};
use kamai_core::Result;

use super::model::{NewTransactionDB, TransactionDB, UploadedFileDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{transactions, uploaded_files};

pub struct UploadRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UploadRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        UploadRepository { pool, writer }
    }
}

#[async_trait]
impl UploadRepositoryTrait for UploadRepository {
    async fn create_upload(&self, new_upload: NewUploadedFile) -> Result<UploadedFile> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<UploadedFile> {
                let id = new_upload
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let upload_db = UploadedFileDB::from_new(new_upload, id, Utc::now().naive_utc());

                let result_db = diesel::insert_into(uploaded_files::table)
                    .values(&upload_db)
                    .returning(UploadedFileDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(UploadedFile::from(result_db))
            })
            .await
    }

    async fn insert_transactions(&self, batch: Vec<NewTransaction>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let created_at = Utc::now().naive_utc();
        let rows = batch
            .into_iter()
            .map(|t| {
                let id = t.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                NewTransactionDB::from_domain(t, id, created_at)
            })
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(StorageError::from)?;
        debug!("Inserting batch of {} transactions", rows.len());

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let inserted = diesel::insert_into(transactions::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted)
            })
            .await
    }

    async fn delete_upload(&self, upload_id: &str) -> Result<usize> {
        let upload_id = upload_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(transactions::table.filter(transactions::upload_id.eq(&upload_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let deleted =
                    diesel::delete(uploaded_files::table.filter(uploaded_files::id.eq(&upload_id)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }

    fn get_upload(&self, upload_id: &str) -> Result<Option<UploadedFile>> {
        let mut conn = get_connection(&self.pool)?;
        let upload = uploaded_files::table
            .find(upload_id)
            .select(UploadedFileDB::as_select())
            .first::<UploadedFileDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(upload.map(UploadedFile::from))
    }

    fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadedFile>> {
        let mut conn = get_connection(&self.pool)?;
        let uploads = uploaded_files::table
            .filter(uploaded_files::user_id.eq(user_id))
            .order((uploaded_files::uploaded_at.desc(), uploaded_files::id.desc()))
            .select(UploadedFileDB::as_select())
            .load::<UploadedFileDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(uploads.into_iter().map(UploadedFile::from).collect())
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order((
                transactions::transaction_date.asc(),
                transactions::created_at.asc(),
            ))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn list_upload_transactions(&self, upload_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::upload_id.eq(upload_id))
            .order((
                transactions::transaction_date.asc(),
                transactions::created_at.asc(),
            ))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}
