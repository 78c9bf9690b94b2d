use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use kamai_core::certificates::{Certificate, CertificateRepositoryTrait};
use kamai_core::Result;

use super::model::CertificateDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::certificates;

pub struct CertificateRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CertificateRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CertificateRepository { pool, writer }
    }
}

#[async_trait]
impl CertificateRepositoryTrait for CertificateRepository {
    async fn insert_certificate(&self, certificate: Certificate) -> Result<Certificate> {
        let certificate_db = CertificateDB::try_from(certificate)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Certificate> {
                let stored = diesel::insert_into(certificates::table)
                    .values(&certificate_db)
                    .returning(CertificateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Certificate::try_from(stored)?)
            })
            .await
    }

    async fn set_certificate_active(&self, certificate_id: &str, is_active: bool) -> Result<usize> {
        let certificate_id = certificate_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let updated = diesel::update(certificates::table.find(&certificate_id))
                    .set(certificates::is_active.eq(is_active))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(updated)
            })
            .await
    }

    fn get_certificate(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        let mut conn = get_connection(&self.pool)?;
        let row = certificates::table
            .find(certificate_id)
            .select(CertificateDB::as_select())
            .first::<CertificateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Certificate::try_from).transpose()?)
    }

    fn certificate_exists(&self, certificate_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(certificates::table.find(certificate_id)))
            .get_result::<bool>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(found)
    }

    fn list_certificates(&self, user_id: &str) -> Result<Vec<Certificate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = certificates::table
            .filter(certificates::user_id.eq(user_id))
            .order((certificates::issued_at.desc(), certificates::id.desc()))
            .select(CertificateDB::as_select())
            .load::<CertificateDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Certificate::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
