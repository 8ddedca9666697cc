//! Serial write actor.
//!
//! SQLite allows one writer at a time. Instead of letting every repository
//! race for the write lock, a single background task owns one pooled
//! connection and executes write jobs strictly in arrival order, each inside
//! an immediate transaction. Repositories send closures and await the reply.

use std::any::Any;
use std::sync::Arc;

use diesel::{Connection, SqliteConnection};
use log::error;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use tradebook_core::errors::{DatabaseError, Error, Result};

/// Bound on queued write jobs before senders start waiting.
const WRITE_QUEUE_DEPTH: usize = 1024;

// A write job is a closure over the actor's connection. The return value is
// boxed as `dyn Any` so one channel can carry jobs of every result type.
type ErasedResult = Box<dyn Any + Send + 'static>;
type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) -> Result<ErasedResult> + Send + 'static>;

/// Handle for submitting jobs to the write actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(WriteJob, oneshot::Sender<Result<ErasedResult>>)>,
}

impl WriteHandle {
    /// Execute a write job on the actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an `Err` return rolls
    /// the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let erased: WriteJob = Box::new(move |conn| job(conn).map(|v| Box::new(v) as ErasedResult));

        self.tx.send((erased, reply_tx)).await.map_err(|_| {
            Error::Database(DatabaseError::ConnectionFailed(
                "write actor is not running".to_string(),
            ))
        })?;

        let result = reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::TransactionFailed(
                "write actor dropped the reply".to_string(),
            ))
        })??;

        result.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "write actor returned an unexpected result type".to_string(),
            ))
        })
    }
}

/// Spawn the write actor and return a handle to it.
///
/// The actor holds one connection from `pool` for its whole lifetime and
/// terminates when the last [`WriteHandle`] is dropped.
pub fn spawn_writer(pool: Arc<DbPool>) -> WriteHandle {
    let (tx, mut rx) =
        mpsc::channel::<(WriteJob, oneshot::Sender<Result<ErasedResult>>)>(WRITE_QUEUE_DEPTH);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Write actor could not acquire a connection: {}", e);
                // Fail every job with a storage-unavailable error.
                while let Some((_job, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(Error::Database(DatabaseError::ConnectionFailed(
                        e.to_string(),
                    ))));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<ErasedResult> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The requester may have gone away; that is not our problem.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
