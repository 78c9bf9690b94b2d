#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result, ValidationError};
    use crate::metrics::aggregate;
    use crate::platforms::Platform;
    use crate::session::SessionContext;
    use crate::uploads::{
        NewTransaction, NewUploadedFile, Transaction, UploadRepositoryTrait, UploadService,
        UploadServiceTrait, UploadedFile,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // --- Mock UploadRepository ---
    #[derive(Clone, Default)]
    struct MockUploadRepository {
        uploads: Arc<Mutex<Vec<UploadedFile>>>,
        transactions: Arc<Mutex<Vec<Transaction>>>,
        batch_sizes: Arc<Mutex<Vec<usize>>>,
        /// 1-based index of the batch that should fail
        fail_on_batch: Option<usize>,
    }

    impl MockUploadRepository {
        fn failing_on_batch(batch: usize) -> Self {
            Self {
                fail_on_batch: Some(batch),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl UploadRepositoryTrait for MockUploadRepository {
        async fn create_upload(&self, new_upload: NewUploadedFile) -> Result<UploadedFile> {
            let upload = UploadedFile {
                id: new_upload
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                user_id: new_upload.user_id,
                filename: new_upload.filename,
                platform: new_upload.platform,
                row_count: new_upload.row_count,
                uploaded_at: Utc::now().naive_utc(),
            };
            self.uploads.lock().unwrap().push(upload.clone());
            Ok(upload)
        }

        async fn insert_transactions(&self, batch: Vec<NewTransaction>) -> Result<usize> {
            let mut sizes = self.batch_sizes.lock().unwrap();
            sizes.push(batch.len());
            if self.fail_on_batch == Some(sizes.len()) {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "disk I/O error".to_string(),
                )));
            }

            let count = batch.len();
            let mut transactions = self.transactions.lock().unwrap();
            transactions.extend(batch.into_iter().map(|t| Transaction {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: t.user_id,
                upload_id: t.upload_id,
                platform: t.platform,
                amount: t.amount,
                transaction_date: t.transaction_date,
                trip_id: t.trip_id,
                raw_data: t.raw_data,
            }));
            Ok(count)
        }

        async fn delete_upload(&self, upload_id: &str) -> Result<usize> {
            let mut uploads = self.uploads.lock().unwrap();
            let before = uploads.len();
            uploads.retain(|u| u.id != upload_id);
            self.transactions
                .lock()
                .unwrap()
                .retain(|t| t.upload_id != upload_id);
            Ok(before - uploads.len())
        }

        fn get_upload(&self, upload_id: &str) -> Result<Option<UploadedFile>> {
            Ok(self
                .uploads
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == upload_id)
                .cloned())
        }

        fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadedFile>> {
            Ok(self
                .uploads
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|u| u.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_upload_transactions(&self, upload_id: &str) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.upload_id == upload_id)
                .cloned()
                .collect())
        }
    }

    const SWIGGY_CSV: &str = "Swiggy Order ID,Order Date,Total Earnings,Area\n\
        SW-1,05/01/2024,\"₹1,200\",Indiranagar\n\
        SW-2,2024-01-20,300,Koramangala\n\
        SW-3,not a date,abc,HSR\n";

    fn numbered_csv(rows: usize) -> String {
        let mut csv = String::from("trip_id,date,fare\n");
        for i in 0..rows {
            csv.push_str(&format!("T{},2024-02-{:02},10\n", i, (i % 28) + 1));
        }
        csv
    }

    #[tokio::test]
    async fn test_upload_csv_stores_upload_and_transactions() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone()));
        let mut session = SessionContext::new("user-1");

        let summary = service
            .upload_csv(&mut session, "swiggy_jan.csv", SWIGGY_CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(summary.upload.platform, Platform::Swiggy);
        assert_eq!(summary.upload.row_count, 3);
        assert_eq!(summary.upload.user_id, "user-1");
        assert_eq!(summary.transactions_inserted, 3);

        let stored = repository.list_transactions("user-1").unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|t| t.upload_id == summary.upload.id));
        assert_eq!(stored[0].amount, dec!(1200));
        assert_eq!(stored[0].transaction_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(stored[0].trip_id, None);
        assert_eq!(stored[2].amount, dec!(0));
        assert_eq!(stored[2].transaction_date, None);
        assert_eq!(
            stored[2].raw_data.get("Area").map(String::as_str),
            Some("HSR")
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv_without_persisting() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone()));
        let mut session = SessionContext::new("user-1");

        let result = service
            .upload_csv(&mut session, "earnings.xlsx", SWIGGY_CSV.as_bytes())
            .await;

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::UnsupportedFileType(_)))
        ));
        assert!(repository.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_extension_check_is_case_insensitive() {
        let service = UploadService::new(Arc::new(MockUploadRepository::default()));
        let mut session = SessionContext::new("user-1");

        let summary = service
            .upload_csv(&mut session, "UBER_MARCH.CSV", b"Uber Trip ID,fare\nU1,250\n")
            .await
            .unwrap();

        assert_eq!(summary.upload.platform, Platform::Uber);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file_without_persisting() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone()));
        let mut session = SessionContext::new("user-1");

        let result = service.upload_csv(&mut session, "empty.csv", b"").await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(repository.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transactions_are_written_in_batches() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone())).with_batch_size(4);
        let mut session = SessionContext::new("user-1");

        let summary = service
            .upload_csv(&mut session, "rides.csv", numbered_csv(10).as_bytes())
            .await
            .unwrap();

        assert_eq!(summary.transactions_inserted, 10);
        assert_eq!(*repository.batch_sizes.lock().unwrap(), vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_failed_batch_aborts_and_keeps_earlier_batches() {
        let repository = MockUploadRepository::failing_on_batch(2);
        let service = UploadService::new(Arc::new(repository.clone())).with_batch_size(4);
        let mut session = SessionContext::new("user-1");

        let result = service
            .upload_csv(&mut session, "rides.csv", numbered_csv(10).as_bytes())
            .await;

        assert!(matches!(result, Err(Error::Database(_))));
        // The third batch is never attempted
        assert_eq!(*repository.batch_sizes.lock().unwrap(), vec![4, 4]);
        // No rollback: the upload record and first batch remain
        assert_eq!(repository.uploads.lock().unwrap().len(), 1);
        assert_eq!(repository.list_transactions("user-1").unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_upload_invalidates_session_snapshot() {
        let service = UploadService::new(Arc::new(MockUploadRepository::default()));
        let mut session = SessionContext::new("user-1");
        session.set_metrics(aggregate(&[], session.time_period));

        service
            .upload_csv(&mut session, "rides.csv", numbered_csv(1).as_bytes())
            .await
            .unwrap();

        assert!(session.metrics().is_none());
    }

    #[tokio::test]
    async fn test_foreign_uploads_are_not_found() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone()));
        let mut owner = SessionContext::new("user-1");
        let mut other = SessionContext::new("user-2");

        let summary = service
            .upload_csv(&mut owner, "rides.csv", numbered_csv(2).as_bytes())
            .await
            .unwrap();
        let upload_id = summary.upload.id;

        assert_eq!(
            service
                .get_upload_transactions(&owner, &upload_id)
                .unwrap()
                .len(),
            2
        );
        assert!(matches!(
            service.get_upload_transactions(&other, &upload_id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.delete_upload(&mut other, &upload_id).await,
            Err(Error::NotFound(_))
        ));
        assert!(service.list_uploads(&other).unwrap().is_empty());
        assert_eq!(service.list_uploads(&owner).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_upload_cascades_and_invalidates() {
        let repository = MockUploadRepository::default();
        let service = UploadService::new(Arc::new(repository.clone()));
        let mut session = SessionContext::new("user-1");

        let first = service
            .upload_csv(&mut session, "a.csv", numbered_csv(3).as_bytes())
            .await
            .unwrap();
        service
            .upload_csv(&mut session, "b.csv", numbered_csv(2).as_bytes())
            .await
            .unwrap();
        session.set_metrics(aggregate(&[], session.time_period));

        service
            .delete_upload(&mut session, &first.upload.id)
            .await
            .unwrap();

        assert!(session.metrics().is_none());
        assert_eq!(repository.list_transactions("user-1").unwrap().len(), 2);
        let remaining = service.list_uploads(&session).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].filename, "b.csv");
    }
}
