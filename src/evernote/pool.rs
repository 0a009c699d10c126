//! Bounded worker pool for blocking store calls
//!
//! Jobs run on tokio's blocking threads; a semaphore caps how many run at
//! once. The pool is created with the client at process start and shut down
//! at process stop. A dispatched job keeps its permit until it finishes, even
//! if the task awaiting it is dropped.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

pub const DEFAULT_POOL_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    Closed,

    #[error("worker job failed: {0}")]
    Join(#[from] JoinError),
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl WorkerPool {
    /// Create a pool running at most `size` jobs at once, clamped to
    /// `1..=Semaphore::MAX_PERMITS`.
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running job.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run a blocking job, waiting for a free slot first.
    pub async fn run<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        let output = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await?;
        Ok(output)
    }

    /// Stop accepting jobs. Jobs already running finish normally.
    pub fn shutdown(&self) {
        tracing::debug!(size = self.size, "Shutting down worker pool");
        self.permits.close();
    }

    pub fn is_shutdown(&self) -> bool {
        self.permits.is_closed()
    }
}
