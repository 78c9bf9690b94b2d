use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use kamai_core::errors::{DatabaseError, Error, Result};
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A write job runs against the actor's connection and returns a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

const WRITE_QUEUE_CAPACITY: usize = 1024;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// Every job runs inside its own immediate transaction, so a job either
    /// commits completely or not at all.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("the write queue is closed"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("the writer dropped the reply"))??;

        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Database(DatabaseError::Internal(
                "Writer returned a value of an unexpected type".to_string(),
            )))
    }
}

fn writer_gone(reason: &str) -> Error {
    Error::Database(DatabaseError::ConnectionFailed(format!(
        "Database writer is not running: {}",
        reason
    )))
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor holds one pooled connection for its whole lifetime and processes
/// write jobs one at a time, in the order they were sent.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(WRITE_QUEUE_CAPACITY);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not get a database connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away (timeout, cancelled request)
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, get_connection, init};
    use diesel::RunQueryDsl;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_failed_job_rolls_back() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("writer.db").to_string_lossy().to_string();
        init(&db_path).unwrap();
        let pool = create_pool(&db_path).unwrap();
        {
            let mut conn = get_connection(&pool).unwrap();
            diesel::sql_query("CREATE TABLE t (v INTEGER NOT NULL)")
                .execute(&mut conn)
                .unwrap();
        }
        let writer = spawn_writer((*pool).clone());

        let result: Result<()> = writer
            .exec(|conn| {
                diesel::sql_query("INSERT INTO t (v) VALUES (1)")
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Err(Error::Unexpected("boom".to_string()))
            })
            .await;
        assert!(result.is_err());

        let inserted = writer
            .exec(|conn| {
                diesel::sql_query("INSERT INTO t (v) VALUES (2)")
                    .execute(conn)
                    .map_err(|e| StorageError::from(e).into())
            })
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        #[derive(diesel::QueryableByName)]
        struct Row {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            v: i32,
        }
        let mut conn = get_connection(&pool).unwrap();
        let rows: Vec<Row> = diesel::sql_query("SELECT v FROM t")
            .load(&mut conn)
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.v).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_constraint_errors_keep_their_kind() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("writer.db").to_string_lossy().to_string();
        init(&db_path).unwrap();
        let pool = create_pool(&db_path).unwrap();
        {
            let mut conn = get_connection(&pool).unwrap();
            diesel::sql_query("CREATE TABLE k (id TEXT PRIMARY KEY NOT NULL)")
                .execute(&mut conn)
                .unwrap();
        }
        let writer = spawn_writer((*pool).clone());
        let insert = || {
            |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::sql_query("INSERT INTO k (id) VALUES ('a')")
                    .execute(conn)
                    .map_err(StorageError::from)?)
            }
        };

        writer.exec(insert()).await.unwrap();
        let duplicate = writer.exec(insert()).await;

        assert!(matches!(
            duplicate,
            Err(Error::Database(DatabaseError::UniqueViolation(_)))
        ));
    }
}
