//! # Worker Pool Module
//!
//! Pool di worker a dimensione fissa che svuota una coda condivisa.
//!
//! ## Modello:
//! - `WorkQueue`: sequenza di path protetta da mutex; `pop` toglie dalla fine
//! - Ogni worker ripete: pop atomico → job → log del risultato, finché la coda è vuota
//! - Coda vuota = uscita normale del worker, mai un'attesa
//! - Un job fallito (o in panic) viene loggato e il worker passa al successivo
//! - `run` ritorna solo dopo il join di tutti i worker
//! - Worker effettivi = `min(richiesti, numero di file)`

use crate::observe::{EventSink, LogLevel};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pending files shared by every worker
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<Vec<PathBuf>>,
}

impl WorkQueue {
    pub fn new(items: Vec<PathBuf>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Take the last pending item, or `None` once the queue is drained.
    pub async fn pop(&self) -> Option<PathBuf> {
        self.items.lock().await.pop()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

/// What the workers produced, merged after the join
#[derive(Debug)]
pub struct PoolOutcome<T> {
    pub completed: Vec<T>,
    /// Files whose job returned an error or panicked, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl<T> Default for PoolOutcome<T> {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> PoolOutcome<T> {
    fn merge(&mut self, other: PoolOutcome<T>) {
        self.completed.extend(other.completed);
        self.failed.extend(other.failed);
    }

    pub fn attempted(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

/// Fixed-size pool draining a `WorkQueue`
pub struct WorkerPool {
    sink: Arc<dyn EventSink>,
}

impl WorkerPool {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Never more workers than files; at least one when there is work.
    pub fn effective_workers(requested: usize, file_count: usize) -> usize {
        requested.max(1).min(file_count)
    }

    /// Run `job(worker_id, path)` once for every file and wait for all workers to exit.
    pub async fn run<F, Fut, T>(&self, files: Vec<PathBuf>, requested_workers: usize, job: F) -> PoolOutcome<T>
    where
        F: Fn(usize, PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let worker_count = Self::effective_workers(requested_workers, files.len());
        if worker_count == 0 {
            self.sink.log(LogLevel::Lifecycle, "[~] Nothing queued, no workers started.");
            return PoolOutcome::default();
        }

        self.sink.log(
            LogLevel::Lifecycle,
            &format!("[~] Starting {} worker(s) for {} file(s).", worker_count, files.len()),
        );

        let queue = Arc::new(WorkQueue::new(files));
        let job = Arc::new(job);

        let handles: Vec<_> = (0..worker_count)
            .map(|worker_id| {
                let queue = queue.clone();
                let job = job.clone();
                let sink = self.sink.clone();
                tokio::spawn(Self::worker_loop(worker_id, queue, job, sink))
            })
            .collect();

        let mut outcome = PoolOutcome::default();
        for (worker_id, joined) in futures::future::join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(worker_outcome) => outcome.merge(worker_outcome),
                Err(e) => self
                    .sink
                    .log(LogLevel::Fatal, &format!("[!] Worker {} stopped abnormally: {}", worker_id, e)),
            }
        }

        self.sink.log(
            LogLevel::Lifecycle,
            &format!(
                "[~] All workers finished ({} succeeded, {} failed).",
                outcome.completed.len(),
                outcome.failed.len()
            ),
        );

        outcome
    }

    async fn worker_loop<F, Fut, T>(
        worker_id: usize,
        queue: Arc<WorkQueue>,
        job: Arc<F>,
        sink: Arc<dyn EventSink>,
    ) -> PoolOutcome<T>
    where
        F: Fn(usize, PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut outcome = PoolOutcome::default();

        while let Some(path) = queue.pop().await {
            sink.log(
                LogLevel::Job,
                &format!("[~] Worker {} picked up \"{}\".", worker_id, path.display()),
            );

            // A panic may come from building the future or from polling it
            let attempt = match std::panic::catch_unwind(AssertUnwindSafe(|| job(worker_id, path.clone()))) {
                Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
                Err(panic) => Err(panic),
            };

            match attempt {
                Ok(Ok(value)) => outcome.completed.push(value),
                Ok(Err(e)) => {
                    sink.log(
                        LogLevel::Job,
                        &format!("[!] Worker {} failed on \"{}\": {:#}", worker_id, path.display(), e),
                    );
                    outcome.failed.push((path, e.to_string()));
                }
                Err(_) => {
                    sink.log(
                        LogLevel::Fatal,
                        &format!("[!] Worker {} panicked on \"{}\", continuing.", worker_id, path.display()),
                    );
                    outcome.failed.push((path, "job panicked".to_string()));
                }
            }
        }

        sink.log(LogLevel::Job, &format!("[~] Worker {} found the queue empty.", worker_id));
        outcome
    }
}
