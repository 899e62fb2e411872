use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use dues_core::errors::{DatabaseError, Error, Result};
use log::{error, warn};
use std::any::Any;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Queue-wait deadline used when the caller does not configure one.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

// Jobs return core::Result so domain errors raised inside a transaction
// reach the caller unchanged.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type AnyResult = Result<Box<dyn Any + Send + 'static>>;

struct Envelope {
    job: Job<Box<dyn Any + Send + 'static>>,
    deadline: Instant,
    reply: oneshot::Sender<AnyResult>,
}

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
    timeout: Duration,
}

impl WriteHandle {
    /// Executes a job on the writer's dedicated connection inside an
    /// `IMMEDIATE` transaction.
    ///
    /// The handle's timeout bounds the time a job may wait in the queue. A job
    /// still queued at its deadline is dropped without touching the database
    /// and fails with `DatabaseError::Timeout`. Once the actor has started a
    /// job, the caller waits for its outcome so a committed write is never
    /// reported as failed.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (reply, ret_rx) = oneshot::channel();
        let deadline = Instant::now() + self.timeout;
        let envelope = Envelope {
            job: Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
            deadline,
            reply,
        };

        let timeout_ms = self.timeout.as_millis() as u64;
        tokio::time::timeout_at(deadline, self.tx.send(envelope))
            .await
            .map_err(|_| Error::Database(DatabaseError::Timeout(timeout_ms)))?
            .map_err(|_| writer_unavailable("the writer has stopped"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_unavailable("the writer dropped the reply"))??;

        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer returned an unexpected result type".to_string(),
            ))
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn writer_unavailable(reason: &str) -> Error {
    Error::Database(DatabaseError::WriterUnavailable(reason.to_string()))
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. The actor owns one pooled connection and processes jobs serially.
pub fn spawn_writer(pool: DbPool, timeout: Duration) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                // Dropping the receiver fails every pending and future job.
                error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some(Envelope {
            job,
            deadline,
            reply,
        }) = rx.recv().await
        {
            if Instant::now() >= deadline {
                warn!("Dropping a write job that expired while queued");
                let _ = reply.send(Err(Error::Database(DatabaseError::Timeout(
                    timeout.as_millis() as u64,
                ))));
                continue;
            }

            let result: AnyResult = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The requester may have gone away.
            let _ = reply.send(result);
        }
    });

    WriteHandle { tx, timeout }
}
